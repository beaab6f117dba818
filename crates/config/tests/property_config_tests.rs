//! Property-based tests for key combination parsing.
//!
//! These tests generate key-map entries from the canonical key vocabulary
//! and check properties the dispatcher relies on:
//! - The canonical string form re-parses to the same combination.
//! - Step and key counts follow the entry's structure.
//! - Spelling variations (case, synonyms, spacing around `+`) do not change
//!   the parsed result.

use proptest::prelude::*;

use hotkeys_config::parse_combination;

/// Strategy for canonical non-modifier keys.
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9]".prop_map(String::from),
        prop_oneof![
            Just("enter"),
            Just("escape"),
            Just("space"),
            Just("tab"),
            Just("up"),
            Just("pagedown"),
            Just("f5"),
            Just("plus"),
            Just("?"),
            Just("@"),
            Just(";"),
        ]
        .prop_map(String::from),
    ]
}

/// Strategy for a subset of modifiers.
fn modifiers_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(vec!["ctrl", "alt", "shift", "meta"], 0..=4)
}

/// Strategy for one chord step: modifiers followed by a key.
fn step_strategy() -> impl Strategy<Value = (Vec<&'static str>, String)> {
    (modifiers_strategy(), key_strategy())
}

fn render(steps: &[(Vec<&'static str>, String)], joiner: &str) -> String {
    steps
        .iter()
        .map(|(mods, key)| {
            let mut parts: Vec<String> = mods.iter().map(|m| m.to_string()).collect();
            parts.push(key.clone());
            parts.join(joiner)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

proptest! {
    #[test]
    fn prop_display_roundtrips(steps in prop::collection::vec(step_strategy(), 1..4)) {
        let entry = render(&steps, "+");
        let combo = parse_combination(&entry).unwrap();
        let reparsed = parse_combination(&combo.to_string()).unwrap();
        prop_assert_eq!(combo, reparsed);
    }

    #[test]
    fn prop_step_and_key_counts(steps in prop::collection::vec(step_strategy(), 1..4)) {
        let entry = render(&steps, "+");
        let combo = parse_combination(&entry).unwrap();
        prop_assert_eq!(combo.step_count(), steps.len());
        for (step, (mods, _)) in combo.steps().iter().zip(&steps) {
            prop_assert_eq!(step.len(), mods.len() + 1);
        }
    }

    #[test]
    fn prop_spacing_and_case_do_not_matter(steps in prop::collection::vec(step_strategy(), 1..3)) {
        let tight = parse_combination(&render(&steps, "+")).unwrap();

        let loose_steps: Vec<(Vec<&'static str>, String)> = steps
            .iter()
            .map(|(mods, key)| {
                let mods = mods
                    .iter()
                    .map(|m| match *m {
                        "ctrl" => "Control",
                        "alt" => "Option",
                        "meta" => "Cmd",
                        other => other,
                    })
                    .collect();
                let key = if key.len() > 1 { key.to_uppercase() } else { key.clone() };
                (mods, key)
            })
            .collect();
        let loose = parse_combination(&render(&loose_steps, " + ")).unwrap();

        prop_assert_eq!(tight, loose);
    }
}
