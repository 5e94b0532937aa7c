// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    verbose = { "Verbose", Severity::Verbose },
    success = { "Success", Severity::Success },
    warning = { "Warning", Severity::Warning },
    error = { "Error", Severity::Error },
    no_log = { "NoLogMsg", Severity::NoLogMsg },
)]
fn parse_known_levels(text: &str, expected: Severity) {
    assert_eq!(Severity::parse(text), Some(expected));
}

#[test]
fn parse_unknown_level() {
    assert_eq!(Severity::parse("Trace"), None);
}

#[test]
fn ordering_tracks_verbosity() {
    assert!(Severity::Verbose < Severity::Error);
    assert!(Severity::Error >= Severity::Warning);
}
