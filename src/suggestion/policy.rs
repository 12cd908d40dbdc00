// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::clock::SharedClock;
use crate::config::OrganizerOptions;
use crate::error::SettingsError;
use crate::settings::SharedSettingsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionTier {
    Plus,
    Patron,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionPlatform {
    Android,
    Ios,
    Web,
    Gift,
}

/// A paid subscription as seen by the entitlement source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub tier: SubscriptionTier,
    pub platform: SubscriptionPlatform,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read access to the user's current subscription; `None` means free tier
pub trait EntitlementReader: Send + Sync {
    fn current_subscription(&self) -> Option<Subscription>;
}

/// A shared reference to an entitlement reader
pub type SharedEntitlementReader = Arc<dyn EntitlementReader>;

/// Entitlement reader that always reports a fixed answer
#[derive(Debug, Clone, Default)]
pub struct StaticEntitlement(pub Option<Subscription>);

impl EntitlementReader for StaticEntitlement {
    fn current_subscription(&self) -> Option<Subscription> {
        self.0.clone()
    }
}

impl StaticEntitlement {
    pub fn shared(subscription: Option<Subscription>) -> SharedEntitlementReader {
        Arc::new(Self(subscription))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    PaidSubscriber,
    DismissedTooOften,
    CoolingDown { until: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptEligibility {
    Eligible,
    Ineligible(IneligibleReason),
}

impl PromptEligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, PromptEligibility::Eligible)
    }
}

/// Decides whether the folder suggestion prompt may be shown
pub struct SuggestionPromptPolicy {
    settings: SharedSettingsStore,
    entitlement: SharedEntitlementReader,
    clock: SharedClock,
    /// `None` keeps a dismissed prompt hidden for good
    cooldown: Option<Duration>,
    max_dismissals: u32,
}

impl SuggestionPromptPolicy {
    pub fn new(
        settings: SharedSettingsStore,
        entitlement: SharedEntitlementReader,
        clock: SharedClock,
        options: &OrganizerOptions,
    ) -> Self {
        Self {
            settings,
            entitlement,
            clock,
            cooldown: options.prompt_cooldown(),
            max_dismissals: options.prompt_max_dismissals,
        }
    }

    pub fn is_eligible_for_popup(&self) -> Result<PromptEligibility, SettingsError> {
        if self.entitlement.current_subscription().is_some() {
            return Ok(PromptEligibility::Ineligible(
                IneligibleReason::PaidSubscriber,
            ));
        }

        let settings = self.settings.load()?;
        if settings.suggested_folders_dismiss_count >= self.max_dismissals {
            return Ok(PromptEligibility::Ineligible(
                IneligibleReason::DismissedTooOften,
            ));
        }

        if let Some(dismissed) = settings.suggested_folders_dismiss_timestamp {
            let until = self
                .cooldown
                .and_then(|cooldown| dismissed.checked_add_signed(cooldown))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            // Eligible only strictly after the window closes
            if self.clock.now() <= until {
                return Ok(PromptEligibility::Ineligible(
                    IneligibleReason::CoolingDown { until },
                ));
            }
        }

        Ok(PromptEligibility::Eligible)
    }

    /// Record a dismissal of the prompt
    pub fn mark_policy_used(&self) -> Result<(), SettingsError> {
        let mut settings = self.settings.load()?;
        let now = self.clock.now();
        // Never moves backwards, even if the clock does
        settings.suggested_folders_dismiss_timestamp = Some(
            settings
                .suggested_folders_dismiss_timestamp
                .map_or(now, |previous| previous.max(now)),
        );
        settings.suggested_folders_dismiss_count =
            settings.suggested_folders_dismiss_count.saturating_add(1);
        self.settings.save(&settings)?;

        debug!(
            count = settings.suggested_folders_dismiss_count,
            "Folder suggestion prompt dismissed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::clock::FixedClock;
    use crate::settings::{MemorySettingsStore, Settings};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn policy(subscription: Option<Subscription>) -> (SuggestionPromptPolicy, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(start()));
        let policy = SuggestionPromptPolicy::new(
            MemorySettingsStore::shared(Settings::default()),
            StaticEntitlement::shared(subscription),
            clock.clone(),
            &OrganizerOptions::default(),
        );
        (policy, clock)
    }

    #[test]
    fn free_user_without_dismissal_is_eligible() {
        let (policy, _) = policy(None);
        assert_eq!(
            policy.is_eligible_for_popup().unwrap(),
            PromptEligibility::Eligible
        );
    }

    #[test]
    fn paid_user_is_never_eligible() {
        let (policy, clock) = policy(Some(Subscription {
            tier: SubscriptionTier::Plus,
            platform: SubscriptionPlatform::Gift,
            expires_at: None,
        }));

        assert_eq!(
            policy.is_eligible_for_popup().unwrap(),
            PromptEligibility::Ineligible(IneligibleReason::PaidSubscriber)
        );
        clock.advance(Duration::days(365));
        assert!(!policy.is_eligible_for_popup().unwrap().is_eligible());
    }

    #[test]
    fn one_dismissal_cools_down_for_seven_days() {
        let (policy, clock) = policy(None);
        policy.mark_policy_used().unwrap();

        clock.set(start() + Duration::days(7));
        assert!(matches!(
            policy.is_eligible_for_popup().unwrap(),
            PromptEligibility::Ineligible(IneligibleReason::CoolingDown { .. })
        ));

        clock.set(start() + Duration::days(7) + Duration::milliseconds(1));
        assert!(policy.is_eligible_for_popup().unwrap().is_eligible());
    }

    #[test]
    fn overflowing_cooldown_keeps_prompt_hidden() {
        let clock = Arc::new(FixedClock::new(start()));
        let policy = SuggestionPromptPolicy::new(
            MemorySettingsStore::shared(Settings::default()),
            StaticEntitlement::shared(None),
            clock.clone(),
            &OrganizerOptions {
                prompt_cooldown_days: 100_000_000_000,
                ..OrganizerOptions::default()
            },
        );
        policy.mark_policy_used().unwrap();
        clock.advance(Duration::days(365 * 1000));

        assert_eq!(
            policy.is_eligible_for_popup().unwrap(),
            PromptEligibility::Ineligible(IneligibleReason::CoolingDown {
                until: DateTime::<Utc>::MAX_UTC
            })
        );
    }

    #[test]
    fn unrepresentable_cooldown_does_not_panic() {
        let clock = Arc::new(FixedClock::new(start()));
        let policy = SuggestionPromptPolicy::new(
            MemorySettingsStore::shared(Settings::default()),
            StaticEntitlement::shared(None),
            clock,
            &OrganizerOptions {
                prompt_cooldown_days: i64::MAX,
                ..OrganizerOptions::default()
            },
        );
        policy.mark_policy_used().unwrap();

        assert!(!policy.is_eligible_for_popup().unwrap().is_eligible());
    }

    #[test]
    fn two_dismissals_block_forever() {
        let (policy, clock) = policy(None);
        policy.mark_policy_used().unwrap();
        clock.advance(Duration::days(8));
        policy.mark_policy_used().unwrap();

        clock.advance(Duration::days(10_000));
        assert_eq!(
            policy.is_eligible_for_popup().unwrap(),
            PromptEligibility::Ineligible(IneligibleReason::DismissedTooOften)
        );

        // Further calls keep counting
        policy.mark_policy_used().unwrap();
        assert!(!policy.is_eligible_for_popup().unwrap().is_eligible());
    }
}
