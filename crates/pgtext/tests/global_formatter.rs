//! Process-wide formatter tests
//!
//! These swap the global formatter, so they live in their own test binary
//! and hold a lock while the swap is in effect.

use parking_lot::Mutex;
use pgtext::{
    Codec, DefaultFormatter, ErrorFormatter, Int2, Issue, Parser, PgType, error_formatter,
    reset_error_formatter, set_error_formatter,
};
use pretty_assertions::assert_eq;

static GLOBAL: Mutex<()> = Mutex::new(());

fn shouting(issue: &Issue) -> String {
    DefaultFormatter.format(issue).to_uppercase()
}

#[test]
fn test_swap_affects_later_diagnostics_only() {
    let _guard = GLOBAL.lock();
    let before = Int2::safe_parse("99999").unwrap_err();

    set_error_formatter(shouting);
    let after = Int2::safe_parse("99999").unwrap_err();
    reset_error_formatter();

    assert_eq!(before.message, "Number must be less than or equal to 32767");
    assert_eq!(after.message, "NUMBER MUST BE LESS THAN OR EQUAL TO 32767");
    assert_eq!(before.code, after.code);
}

#[test]
fn test_adapter_uses_active_formatter() {
    let _guard = GLOBAL.lock();
    set_error_formatter(|_: &Issue| "nope".to_string());
    let err = Parser::of::<Int2>().is_valid(None).unwrap_err();
    reset_error_formatter();
    assert_eq!(err.message, "nope");
}

#[test]
fn test_sessions_ignore_global_swaps() {
    let _guard = GLOBAL.lock();
    let session = Codec::new();
    let snapshot = {
        set_error_formatter(shouting);
        let snapshot = Codec::from_active_formatter();
        reset_error_formatter();
        snapshot
    };

    let plain = session.safe_parse::<Int2>("x").unwrap_err();
    let loud = snapshot.safe_parse::<Int2>("x").unwrap_err();
    assert_eq!(plain.message, "Invalid int2: \"x\"");
    assert_eq!(loud.message, "INVALID INT2: \"X\"");
}

#[test]
fn test_reset_restores_default() {
    let _guard = GLOBAL.lock();
    set_error_formatter(shouting);
    reset_error_formatter();
    let issue = Issue::invalid_string("uuid", "zz");
    assert_eq!(error_formatter().format(&issue), DefaultFormatter.format(&issue));
}
