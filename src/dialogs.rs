use std::collections::HashMap;

use crate::connect::{Addon, Credentials};
use crate::sequencer::Outcome;
use crate::ui::{Dialog, UserEvent, WizardUi};

/// Decision of the base registration form.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationDecision {
    Submit(Credentials),
    Skip,
    Back,
    Abort,
}

/// Decision of a single license dialog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EulaDecision {
    Accepted,
    Declined,
    Aborted,
}

/// Decision of the registration-codes dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum RegCodesDecision {
    Submitted(HashMap<String, String>),
    Back,
    Abort,
}

/// Base-system registration form. Loops until the user submits credentials
/// or navigates away.
pub fn base_registration_dialog(
    ui: &mut impl WizardUi,
    url: &str,
    prefill: &Credentials,
) -> RegistrationDecision {
    loop {
        ui.render(&Dialog::RegistrationForm {
            url,
            credentials: prefill,
        });
        match ui.await_input() {
            UserEvent::Credentials(credentials) => return RegistrationDecision::Submit(credentials),
            UserEvent::Skip => return RegistrationDecision::Skip,
            UserEvent::Back => return RegistrationDecision::Back,
            UserEvent::Abort | UserEvent::Cancel => return RegistrationDecision::Abort,
            _ => {}
        }
    }
}

/// Dialog shown when the system already holds a registration.
pub fn registered_system_dialog(ui: &mut impl WizardUi) -> Outcome {
    loop {
        ui.render(&Dialog::RegisteredSystem);
        match ui.await_input() {
            UserEvent::Next => return Outcome::Next,
            UserEvent::Reregister => return Outcome::Register,
            UserEvent::Extensions => return Outcome::Extensions,
            UserEvent::Abort | UserEvent::Cancel => return Outcome::Abort,
            _ => {}
        }
    }
}

/// Add-on selection with a beta filter.
///
/// Beta add-ons are hidden while the filter is on, unless already selected.
/// Confirming an empty selection is reported as `skip` — there is nothing
/// to license or register downstream.
pub fn addon_selection_dialog(
    ui: &mut impl WizardUi,
    addons: &[Addon],
    selected: &mut [bool],
    filter_beta: &mut bool,
) -> Outcome {
    loop {
        let visible: Vec<usize> = addons
            .iter()
            .enumerate()
            .filter(|(index, addon)| !*filter_beta || !addon.beta || selected[*index])
            .map(|(index, _)| index)
            .collect();
        let shown: Vec<Addon> = visible.iter().map(|&index| addons[index].clone()).collect();
        let marks: Vec<bool> = visible.iter().map(|&index| selected[index]).collect();

        ui.render(&Dialog::AddonSelection {
            addons: &shown,
            selected: &marks,
            filter_beta: *filter_beta,
        });

        match ui.await_input() {
            UserEvent::Toggle(shown_index) => {
                if let Some(&index) = visible.get(shown_index) {
                    selected[index] = !selected[index];
                }
            }
            UserEvent::FilterBeta(value) => *filter_beta = value,
            UserEvent::Next => {
                return if selected.iter().any(|&picked| picked) {
                    Outcome::Next
                } else {
                    Outcome::Skip
                };
            }
            // The selection dialog has no "previous" step of its own; both
            // gestures return the user to the workflow entry.
            UserEvent::Back | UserEvent::Cancel => return Outcome::Cancel,
            UserEvent::Abort => return Outcome::Abort,
            _ => {}
        }
    }
}

/// One license agreement, accepted or declined.
pub fn addon_eula_dialog(ui: &mut impl WizardUi, addon: &Addon, text: &str) -> EulaDecision {
    loop {
        ui.render(&Dialog::Eula { addon, text });
        match ui.await_input() {
            UserEvent::Accept | UserEvent::Next => return EulaDecision::Accepted,
            UserEvent::Decline | UserEvent::Back => return EulaDecision::Declined,
            UserEvent::Abort | UserEvent::Cancel => return EulaDecision::Aborted,
            _ => {}
        }
    }
}

/// Registration codes for the non-free add-ons in the selection.
pub fn addon_regcodes_dialog(
    ui: &mut impl WizardUi,
    addons: &[&Addon],
    known: &HashMap<String, String>,
) -> RegCodesDecision {
    loop {
        ui.render(&Dialog::RegCodes { addons, known });
        match ui.await_input() {
            UserEvent::RegCodes(codes) => return RegCodesDecision::Submitted(codes),
            // Plain confirmation keeps whatever codes are already known.
            UserEvent::Next => return RegCodesDecision::Submitted(HashMap::new()),
            UserEvent::Back => return RegCodesDecision::Back,
            UserEvent::Abort | UserEvent::Cancel => return RegCodesDecision::Abort,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::ScriptedUi;

    fn addon(identifier: &str, free: bool, beta: bool) -> Addon {
        Addon {
            identifier: identifier.into(),
            name: identifier.into(),
            version: "1.0".into(),
            arch: "x86_64".into(),
            free,
            beta,
            recommended: false,
            description: String::new(),
            eula_url: None,
        }
    }

    #[test]
    fn registration_form_submits_credentials() {
        let mut ui = ScriptedUi::new(vec![UserEvent::Credentials(Credentials {
            email: "admin@example.com".into(),
            reg_code: "REGCODE-42".into(),
        })]);

        let decision =
            base_registration_dialog(&mut ui, "https://connect.example.com", &Credentials::default());

        match decision {
            RegistrationDecision::Submit(credentials) => {
                assert_eq!(credentials.reg_code, "REGCODE-42");
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[test]
    fn registration_form_can_be_skipped() {
        let mut ui = ScriptedUi::new(vec![UserEvent::Skip]);
        let decision =
            base_registration_dialog(&mut ui, "https://connect.example.com", &Credentials::default());
        assert_eq!(decision, RegistrationDecision::Skip);
    }

    #[test]
    fn empty_selection_is_reported_as_skip() {
        let mut ui = ScriptedUi::new(vec![UserEvent::Next]);
        let addons = [addon("containers", true, false)];
        let mut selected = vec![false];
        let mut filter = true;

        let outcome = addon_selection_dialog(&mut ui, &addons, &mut selected, &mut filter);

        assert_eq!(outcome, Outcome::Skip);
    }

    #[test]
    fn toggled_selection_is_reported_as_next() {
        let mut ui = ScriptedUi::new(vec![UserEvent::Toggle(0), UserEvent::Next]);
        let addons = [addon("containers", true, false)];
        let mut selected = vec![false];
        let mut filter = true;

        let outcome = addon_selection_dialog(&mut ui, &addons, &mut selected, &mut filter);

        assert_eq!(outcome, Outcome::Next);
        assert!(selected[0]);
    }

    #[test]
    fn beta_addons_are_hidden_while_filtered() {
        let mut ui = ScriptedUi::new(vec![UserEvent::Next]);
        let addons = [addon("stable", true, false), addon("experimental", true, true)];
        let mut selected = vec![false, false];
        let mut filter = true;

        addon_selection_dialog(&mut ui, &addons, &mut selected, &mut filter);

        assert!(ui.rendered[0].contains("stable"));
        assert!(!ui.rendered[0].contains("experimental"));
    }

    #[test]
    fn disabling_the_filter_reveals_beta_addons() {
        let mut ui = ScriptedUi::new(vec![UserEvent::FilterBeta(false), UserEvent::Next]);
        let addons = [addon("stable", true, false), addon("experimental", true, true)];
        let mut selected = vec![false, false];
        let mut filter = true;

        addon_selection_dialog(&mut ui, &addons, &mut selected, &mut filter);

        assert!(!filter);
        assert!(ui.rendered[1].contains("experimental"));
    }

    #[test]
    fn toggle_indexes_follow_the_visible_list() {
        // With the beta add-on hidden, index 1 is the second *visible* entry.
        let mut ui = ScriptedUi::new(vec![UserEvent::Toggle(1), UserEvent::Next]);
        let addons = [
            addon("stable", true, false),
            addon("experimental", true, true),
            addon("ha", false, false),
        ];
        let mut selected = vec![false, false, false];
        let mut filter = true;

        addon_selection_dialog(&mut ui, &addons, &mut selected, &mut filter);

        assert_eq!(selected, vec![false, false, true]);
    }

    #[test]
    fn selected_beta_addon_stays_visible_after_filtering() {
        let mut ui = ScriptedUi::new(vec![
            UserEvent::FilterBeta(false),
            UserEvent::Toggle(1),
            UserEvent::FilterBeta(true),
            UserEvent::Next,
        ]);
        let addons = [addon("stable", true, false), addon("experimental", true, true)];
        let mut selected = vec![false, false];
        let mut filter = true;

        let outcome = addon_selection_dialog(&mut ui, &addons, &mut selected, &mut filter);

        assert_eq!(outcome, Outcome::Next);
        // Last render still lists the selected beta add-on.
        assert!(ui.rendered.last().unwrap().contains("experimental"));
    }

    #[test]
    fn eula_decline_navigates_back() {
        let mut ui = ScriptedUi::new(vec![UserEvent::Decline]);
        let containers = addon("containers", true, false);

        let decision = addon_eula_dialog(&mut ui, &containers, "License terms.");

        assert_eq!(decision, EulaDecision::Declined);
    }

    #[test]
    fn regcodes_dialog_submits_entered_codes() {
        let mut codes = HashMap::new();
        codes.insert("ha".to_string(), "HA-CODE".to_string());
        let mut ui = ScriptedUi::new(vec![UserEvent::RegCodes(codes)]);
        let ha = addon("ha", false, false);

        let decision = addon_regcodes_dialog(&mut ui, &[&ha], &HashMap::new());

        match decision {
            RegCodesDecision::Submitted(submitted) => {
                assert_eq!(submitted.get("ha").map(String::as_str), Some("HA-CODE"));
            }
            other => panic!("expected Submitted, got {other:?}"),
        }
    }
}
