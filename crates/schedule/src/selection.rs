use std::collections::BTreeMap;

use time::OffsetDateTime;
use ulid::Ulid;

use comedor_shared::meal::{Alternative, MealSlot, WeeklySelection};
use comedor_store::{Document, DocumentStore};

use crate::ScheduleError;
use crate::config::{ResidenceConfig, collections};

/// Default weekly mapping: every active, ordinary slot maps to its
/// principal alternative when exactly one active principal exists; zero
/// or several principals leave the slot unmapped.
pub fn default_choices(
    slots: &[MealSlot],
    alternatives: &[Alternative],
) -> BTreeMap<String, Option<String>> {
    let mut choices = BTreeMap::new();

    for slot in slots.iter().filter(|s| s.active && s.ordinary) {
        let mut principals = alternatives
            .iter()
            .filter(|a| a.active && a.principal && a.slot_id == slot.id);

        if let (Some(principal), None) = (principals.next(), principals.next()) {
            choices.insert(slot.id.clone(), Some(principal.id.clone()));
        }
    }

    choices
}

impl<S: DocumentStore> crate::Schedule<S> {
    /// Returns the user's weekly default selection, seeding it from the
    /// principal alternatives on first access. Idempotent: an existing
    /// document is returned unchanged; more than one existing document
    /// is the ambiguous terminal state and surfaces as an integrity
    /// error, never auto-merged.
    ///
    /// The create is not transactional against a concurrent initializer
    /// for the same user; a race produces two documents, detected on the
    /// next call.
    pub async fn ensure_weekly_selection(
        &self,
        user_id: &str,
        config: &ResidenceConfig,
        now: OffsetDateTime,
    ) -> Result<WeeklySelection, ScheduleError> {
        if let Some(selection) = self.find_weekly_selection(user_id).await? {
            return Ok(selection);
        }

        let selection = WeeklySelection {
            id: Ulid::new().to_string(),
            user_id: user_id.to_owned(),
            residence_id: self.residence_id().to_owned(),
            choices: default_choices(&config.slots, &config.alternatives),
            updated_at: now.unix_timestamp(),
        };

        self.store()
            .insert(
                collections::WEEKLY_SELECTIONS,
                Document::encode(&selection.id, &selection)?,
            )
            .await?;

        Ok(selection)
    }
}
