// ─── Platform Rules ───
// OS/architecture rules attached to libraries in a release descriptor.

use std::fmt;

use serde::Deserialize;

/// OS names as they appear in descriptor rules and `natives` maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsName {
    Windows,
    Osx,
    Linux,
}

impl OsName {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsName::Windows
        } else if cfg!(target_os = "macos") {
            OsName::Osx
        } else {
            OsName::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OsName::Windows => "windows",
            OsName::Osx => "osx",
            OsName::Linux => "linux",
        }
    }
}

/// Canonical architecture tokens used by `os.arch` rule constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    X86,
    Arm64,
    Arm32,
    Other(&'static str),
}

impl Arch {
    pub fn current() -> Self {
        Self::from_target(std::env::consts::ARCH)
    }

    pub fn from_target(target_arch: &'static str) -> Self {
        match target_arch {
            "x86_64" => Arch::X64,
            "x86" => Arch::X86,
            "aarch64" => Arch::Arm64,
            "arm" => Arch::Arm32,
            other => Arch::Other(other),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "x86",
            Arch::Arm64 => "arm64",
            Arch::Arm32 => "arm32",
            Arch::Other(name) => name,
        }
    }

    /// Replacement for the `${arch}` placeholder in native classifier keys.
    pub fn bits(self) -> &'static str {
        match self {
            Arch::X64 | Arch::Arm64 => "64",
            Arch::X86 | Arch::Arm32 => "32",
            Arch::Other(_) if cfg!(target_pointer_width = "64") => "64",
            Arch::Other(_) => "32",
        }
    }
}

/// The (OS, architecture) pair rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: OsName,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: OsName, arch: Arch) -> Self {
        Self { os, arch }
    }

    pub fn current() -> Self {
        Self::new(OsName::current(), Arch::current())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsConstraint>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsConstraint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

impl Rule {
    /// A rule without an `os` block applies everywhere.
    pub fn matches(&self, platform: &Platform) -> bool {
        let Some(os) = &self.os else {
            return true;
        };
        let name_matches = os
            .name
            .as_deref()
            .map_or(true, |name| name == platform.os.as_str());
        let arch_matches = os
            .arch
            .as_deref()
            .map_or(true, |arch| arch == platform.arch.as_str());
        name_matches && arch_matches
    }
}

/// Evaluate a rule list: the last matching rule decides, and when nothing
/// matches the answer is deny.
pub fn evaluate_rules(rules: &[Rule], platform: &Platform) -> bool {
    rules
        .iter()
        .rev()
        .find(|rule| rule.matches(platform))
        .is_some_and(|rule| rule.action == RuleAction::Allow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(action: RuleAction, os: Option<(&str, Option<&str>)>) -> Rule {
        Rule {
            action,
            os: os.map(|(name, arch)| OsConstraint {
                name: Some(name.to_string()),
                arch: arch.map(str::to_string),
            }),
        }
    }

    const LINUX_X64: Platform = Platform {
        os: OsName::Linux,
        arch: Arch::X64,
    };

    #[test]
    fn nothing_matching_means_deny() {
        let rules = vec![rule(RuleAction::Allow, Some(("osx", None)))];
        assert!(!evaluate_rules(&rules, &LINUX_X64));

        let rules = vec![
            rule(RuleAction::Allow, Some(("windows", None))),
            rule(RuleAction::Disallow, Some(("osx", None))),
        ];
        assert!(!evaluate_rules(&rules, &LINUX_X64));
    }

    #[test]
    fn last_matching_rule_wins() {
        // The classic "everywhere except osx" pair.
        let rules = vec![
            rule(RuleAction::Allow, None),
            rule(RuleAction::Disallow, Some(("osx", None))),
        ];
        assert!(evaluate_rules(&rules, &LINUX_X64));
        assert!(!evaluate_rules(
            &rules,
            &Platform::new(OsName::Osx, Arch::Arm64)
        ));

        let rules = vec![
            rule(RuleAction::Disallow, None),
            rule(RuleAction::Allow, Some(("linux", None))),
        ];
        assert!(evaluate_rules(&rules, &LINUX_X64));

        let rules = vec![
            rule(RuleAction::Allow, Some(("linux", None))),
            rule(RuleAction::Disallow, None),
        ];
        assert!(!evaluate_rules(&rules, &LINUX_X64));
    }

    #[test]
    fn arch_constraints_narrow_a_rule() {
        let rules = vec![rule(RuleAction::Allow, Some(("linux", Some("arm64"))))];
        assert!(!evaluate_rules(&rules, &LINUX_X64));
        assert!(evaluate_rules(
            &rules,
            &Platform::new(OsName::Linux, Arch::Arm64)
        ));
    }

    #[test]
    fn empty_rule_list_denies() {
        assert!(!evaluate_rules(&[], &LINUX_X64));
    }

    #[test]
    fn missing_action_defaults_to_allow() {
        let parsed: Rule = serde_json::from_value(serde_json::json!({
            "os": { "name": "linux" }
        }))
        .unwrap();
        assert_eq!(parsed.action, RuleAction::Allow);
        assert!(parsed.matches(&LINUX_X64));
    }

    #[test]
    fn arch_tokens() {
        assert_eq!(Arch::from_target("x86_64"), Arch::X64);
        assert_eq!(Arch::from_target("aarch64").as_str(), "arm64");
        assert_eq!(Arch::X86.bits(), "32");
        assert_eq!(Arch::Arm64.bits(), "64");
        assert_eq!(LINUX_X64.to_string(), "linux-x64");
    }
}
