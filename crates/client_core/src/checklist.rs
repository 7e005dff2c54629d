//! Surgical-safety checklist: purely local state, never persisted remotely.

use shared::domain::OperativePhase;
use shared::protocol::ChecklistItem;
use tracing::info;

fn item(id: &str, text: &str, phase: OperativePhase) -> ChecklistItem {
    ChecklistItem {
        id: id.to_string(),
        text: text.to_string(),
        phase,
        completed: false,
    }
}

/// The fixed WHO template every checklist instance is seeded from.
fn template() -> Vec<ChecklistItem> {
    use OperativePhase::{IntraOp, PostOp, PreOp};
    vec![
        item("1", "Patient identity, site, procedure confirmed", PreOp),
        item("2", "Site marked (if applicable)", PreOp),
        item("3", "Anesthesia safety check completed", PreOp),
        item("4", "Pulse oximeter on and functioning", PreOp),
        item("5", "Does patient have known allergy?", PreOp),
        item(
            "6",
            "All team members introduced themselves by name and role",
            IntraOp,
        ),
        item(
            "7",
            "Surgeon, anesthesia professional, and nurse verbally confirm patient identity",
            IntraOp,
        ),
        item("8", "Antibiotic prophylaxis given within last 60 mins", IntraOp),
        item("9", "Instrument, sponge and needle counts correct", PostOp),
        item(
            "10",
            "Specimen labeled correctly (including patient name)",
            PostOp,
        ),
    ]
}

pub struct Checklist {
    items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn new() -> Self {
        Self { items: template() }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn items_for_phase(&self, phase: OperativePhase) -> Vec<&ChecklistItem> {
        self.items
            .iter()
            .filter(|item| item.phase == phase)
            .collect()
    }

    /// Flips the completion of exactly one item. Unknown ids are a no-op.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.completed = !item.completed;
                true
            }
            None => false,
        }
    }

    /// Restores the entire fixed template, discarding all toggles.
    pub fn reset(&mut self) {
        self.items = template();
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    pub fn completion_percent(&self) -> u8 {
        if self.items.is_empty() {
            return 0;
        }
        let ratio = self.completed_count() as f64 / self.items.len() as f64;
        (ratio * 100.0).round() as u8
    }

    /// Local action only; there is no persistence call behind it.
    pub fn finalize(&self) {
        info!(
            completion_percent = self.completion_percent(),
            "checklist finalized locally; no remote persistence configured"
        );
    }
}

impl Default for Checklist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_original_completion() {
        let mut checklist = Checklist::new();
        let before = checklist.items()[3].clone();

        assert!(checklist.toggle("4"));
        assert_ne!(checklist.items()[3].completed, before.completed);
        assert!(checklist.toggle("4"));
        assert_eq!(checklist.items()[3], before);
    }

    #[test]
    fn toggle_flips_exactly_one_item() {
        let mut checklist = Checklist::new();
        assert!(checklist.toggle("7"));

        let flipped: Vec<&str> = checklist
            .items()
            .iter()
            .filter(|item| item.completed)
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(flipped, ["7"]);
    }

    #[test]
    fn toggle_unknown_id_is_a_no_op() {
        let mut checklist = Checklist::new();
        assert!(!checklist.toggle("99"));
        assert_eq!(checklist.completed_count(), 0);
    }

    #[test]
    fn reset_restores_template_after_arbitrary_toggles() {
        let mut checklist = Checklist::new();
        for id in ["1", "2", "5", "9", "10"] {
            checklist.toggle(id);
        }
        checklist.reset();
        assert_eq!(checklist.items(), Checklist::new().items());
    }

    #[test]
    fn completion_percent_is_rounded_ratio() {
        let mut checklist = Checklist::new();
        assert_eq!(checklist.completion_percent(), 0);

        // 3 of 10 complete.
        for id in ["1", "2", "3"] {
            checklist.toggle(id);
        }
        assert_eq!(checklist.completion_percent(), 30);

        checklist.toggle("4");
        assert_eq!(checklist.completion_percent(), 40);
    }

    #[test]
    fn completion_percent_is_monotonic_in_completed_count() {
        let mut checklist = Checklist::new();
        let ids: Vec<String> = checklist
            .items()
            .iter()
            .map(|item| item.id.clone())
            .collect();

        let mut previous = checklist.completion_percent();
        for id in ids {
            checklist.toggle(&id);
            let current = checklist.completion_percent();
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn phase_filter_partitions_the_template() {
        let checklist = Checklist::new();
        let pre = checklist.items_for_phase(OperativePhase::PreOp).len();
        let intra = checklist.items_for_phase(OperativePhase::IntraOp).len();
        let post = checklist.items_for_phase(OperativePhase::PostOp).len();

        assert_eq!(pre, 5);
        assert_eq!(intra, 3);
        assert_eq!(post, 2);
        assert_eq!(pre + intra + post, checklist.items().len());
    }
}
