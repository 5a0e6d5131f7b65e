// SPDX-License-Identifier: Apache-2.0

pub const ENV_CROPCONNECT_BUYER_MAY_CANCEL: &str = "CROPCONNECT_BUYER_MAY_CANCEL";
pub const ENV_CROPCONNECT_ALLOW_PAST_DELIVERY: &str = "CROPCONNECT_ALLOW_PAST_DELIVERY";
pub const ENV_CROPCONNECT_PASSWORD_ITERATIONS: &str = "CROPCONNECT_PASSWORD_ITERATIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// The contract's buyer may move it PENDING -> CANCELLED.
    pub buyer_may_cancel_pending: bool,
    /// Accept delivery dates earlier than the creation date.
    pub allow_past_delivery: bool,
    pub password_iterations: u32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            buyer_may_cancel_pending: true,
            allow_past_delivery: false,
            password_iterations: 10_000,
        }
    }
}

impl LifecyclePolicy {
    /// Shared by the server and the CLI so both enforce the same rules.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Unset or unparsable variables keep the default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| {
            lookup(name)
                .and_then(|v| parse_flag(v.trim()))
                .unwrap_or(default)
        };
        let password_iterations = lookup(ENV_CROPCONNECT_PASSWORD_ITERATIONS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map_or(defaults.password_iterations, |n| {
                u32::try_from(n).unwrap_or(u32::MAX).max(1)
            });
        Self {
            buyer_may_cancel_pending: flag(
                ENV_CROPCONNECT_BUYER_MAY_CANCEL,
                defaults.buyer_may_cancel_pending,
            ),
            allow_past_delivery: flag(
                ENV_CROPCONNECT_ALLOW_PAST_DELIVERY,
                defaults.allow_past_delivery,
            ),
            password_iterations,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_from(pairs: &[(&str, &str)]) -> LifecyclePolicy {
        LifecyclePolicy::from_lookup(|name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        })
    }

    #[test]
    fn unset_variables_keep_the_defaults() {
        assert_eq!(policy_from(&[]), LifecyclePolicy::default());
    }

    #[test]
    fn variables_override_each_rule() {
        let policy = policy_from(&[
            ("CROPCONNECT_BUYER_MAY_CANCEL", "no"),
            ("CROPCONNECT_ALLOW_PAST_DELIVERY", "1"),
            ("CROPCONNECT_PASSWORD_ITERATIONS", "0"),
        ]);
        assert!(!policy.buyer_may_cancel_pending);
        assert!(policy.allow_past_delivery);
        assert_eq!(policy.password_iterations, 1);
    }

    #[test]
    fn garbage_values_fall_back() {
        let policy = policy_from(&[
            ("CROPCONNECT_BUYER_MAY_CANCEL", "sometimes"),
            ("CROPCONNECT_PASSWORD_ITERATIONS", "many"),
        ]);
        assert!(policy.buyer_may_cancel_pending);
        assert_eq!(policy.password_iterations, 10_000);
    }
}
