//! Authorizer lints: custom lints for gateway-authorizer invariants.
//!
//! ## Implemented Lints
//!
//! - `NO_PRINTLN`: Forbids println!, eprintln!, and dbg! macros. All output
//!   goes through `tracing` so tokens stay out of raw stdout/stderr.
//! - `NO_UNTRACKED_SPAWN`: Forbids `tokio::spawn` and `tokio::task::spawn`.
//!   Background work goes through the audit recorder's task tracker so
//!   shutdown can drain it.

#![feature(rustc_private)]
#![warn(unused_extern_crates)]

extern crate rustc_ast;
extern crate rustc_lint;
extern crate rustc_session;
extern crate rustc_span;

use rustc_ast::{Expr, ExprKind, MacCall, Path};
use rustc_lint::{EarlyContext, EarlyLintPass, LintContext};
use rustc_session::{declare_lint_pass, declare_tool_lint};

declare_tool_lint! {
    /// **What it does:** Forbids use of `println!`, `eprintln!`, and `dbg!` macros.
    ///
    /// **Why is this bad?** They write unstructured text straight to
    /// stdout/stderr. Authorizer logs are JSON lines stamped with a
    /// correlation id, and a stray `dbg!` on a request can print the raw
    /// bearer token.
    ///
    /// **Known problems:** None.
    ///
    /// **Example:**
    /// ```rust,ignore
    /// // Bad
    /// println!("authorized {}", subject);
    /// dbg!(&credential);
    ///
    /// // Good
    /// ctx.log().info(format_args!("Successfully authorized user"));
    /// tracing::error!(error = %err, "Failed to write to break-glass index");
    /// ```
    pub authorizer_lints::NO_PRINTLN,
    Deny,
    "use of println!, eprintln!, or dbg! macros; use tracing instead"
}

declare_tool_lint! {
    /// **What it does:** Forbids `tokio::spawn` and `tokio::task::spawn`.
    ///
    /// **Why is this bad?** A detached task is invisible at shutdown. An
    /// audit write spawned this way is silently lost when the host freezes
    /// or exits, instead of being drained or reported as missed.
    ///
    /// **Known problems:** Only fully qualified calls are caught. A `use
    /// tokio::spawn;` followed by a bare `spawn(..)` is not.
    ///
    /// **Example:**
    /// ```rust,ignore
    /// // Bad
    /// tokio::spawn(async move { store.put(record).await });
    ///
    /// // Good
    /// recorder.record(subject, correlation_id);
    /// ```
    pub authorizer_lints::NO_UNTRACKED_SPAWN,
    Deny,
    "use of tokio::spawn; dispatch background work through a TaskTracker"
}

declare_lint_pass!(NoPrintln => [NO_PRINTLN]);
declare_lint_pass!(NoUntrackedSpawn => [NO_UNTRACKED_SPAWN]);

impl EarlyLintPass for NoPrintln {
    fn check_expr(&mut self, cx: &EarlyContext<'_>, expr: &Expr) {
        if let ExprKind::MacCall(mac) = &expr.kind {
            check_macro(cx, mac, expr.span);
        }
    }
}

impl EarlyLintPass for NoUntrackedSpawn {
    fn check_expr(&mut self, cx: &EarlyContext<'_>, expr: &Expr) {
        if let ExprKind::Call(func, _) = &expr.kind {
            if let ExprKind::Path(_, path) = &func.kind {
                if is_tokio_spawn(path) {
                    cx.span_lint(NO_UNTRACKED_SPAWN, expr.span, |diag| {
                        diag.help("use `TaskTracker::spawn` or `AuditRecorder::record`");
                        diag.note("untracked tasks are dropped at shutdown without a trace");
                    });
                }
            }
        }
    }
}

fn is_tokio_spawn(path: &Path) -> bool {
    let segments: Vec<&str> = path
        .segments
        .iter()
        .map(|s| s.ident.name.as_str())
        .collect();

    matches!(
        segments.as_slice(),
        ["tokio", "spawn"] | ["tokio", "task", "spawn"]
    )
}

fn check_macro(cx: &EarlyContext<'_>, mac: &MacCall, span: rustc_span::Span) {
    let path = &mac.path;

    if path.segments.len() != 1 {
        return;
    }

    let (help, note) = match path.segments[0].ident.name.as_str() {
        "println" => (
            "use `tracing::info!` or the request context logger",
            "`println!` output is unstructured and not correlated to a request",
        ),
        "eprintln" => (
            "use `tracing::error!` or the request context logger",
            "`eprintln!` output is unstructured and not correlated to a request",
        ),
        "dbg" => (
            "use `tracing::debug!` with `Credential::preview` for tokens",
            "`dbg!` prints values verbatim, including bearer tokens",
        ),
        _ => return,
    };

    cx.span_lint(NO_PRINTLN, span, |diag| {
        diag.help(help);
        diag.note(note);
    });
}

#[unsafe(no_mangle)]
#[allow(unsafe_code)]
pub extern "C" fn register_lints(_sess: &rustc_session::Session, lint_store: &mut rustc_lint::LintStore) {
    lint_store.register_lints(&[&NO_PRINTLN, &NO_UNTRACKED_SPAWN]);
    lint_store.register_early_pass(|| Box::new(NoPrintln));
    lint_store.register_early_pass(|| Box::new(NoUntrackedSpawn));
}

#[unsafe(no_mangle)]
pub fn dylint_version() -> *mut std::os::raw::c_char {
    std::ffi::CString::new(dylint_linting::DYLINT_VERSION)
        .expect("version string contains null byte")
        .into_raw()
}
