// Test cases for NO_PRINTLN and NO_UNTRACKED_SPAWN

fn bad_println(subject: &str) {
    println!("authorized {}", subject);
}

fn bad_eprintln() {
    eprintln!("Failed to write to break-glass index");
}

fn bad_dbg() {
    let token = "eyJhbGciOiJIUzI1NiJ9";
    dbg!(token);
}

async fn bad_spawn() {
    tokio::spawn(async {});
    tokio::task::spawn(async {});
}

// Good: structured logging and tracked tasks
fn good_tracing() {
    tracing::info!(correlation_id = "c0ffee", "Successfully authorized user");
}

fn good_tracked_spawn(tasks: &tokio_util::task::TaskTracker) {
    tasks.spawn(async {});
}

fn main() {
    bad_println("user-123");
    bad_eprintln();
    bad_dbg();
    let _ = bad_spawn();
    good_tracing();
}
