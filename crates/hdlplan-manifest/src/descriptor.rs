//! Module descriptors: the declarative, context-dependent selection rules of
//! one module.
//!
//! A descriptor is plain data. It is produced by the manifest parser or
//! built directly by an embedding tool, and evaluated by
//! [`crate::evaluate::evaluate`].

use hdlplan_common::types::{Action, ScopedPath};
use serde::{Deserialize, Serialize};

/// A reference from one module to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "path", rename_all = "lowercase")]
pub enum ModuleRef {
    /// Relative to the referencing module's directory, in its scope.
    Local(String),
    /// Rooted at the external module root.
    External(String),
}

impl ModuleRef {
    /// Resolves the reference against the key of the referencing module.
    #[must_use]
    pub fn resolve_from(&self, referrer: &ScopedPath) -> ScopedPath {
        match self {
            Self::Local(path) => referrer.join(path),
            Self::External(path) => ScopedPath::external(path),
        }
    }

    /// Returns the path as written.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Local(path) | Self::External(path) => path,
        }
    }
}

/// Files and module references contributed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clause {
    /// Source files, relative to the module directory.
    pub files: Vec<String>,
    /// Referenced modules.
    pub modules: Vec<ModuleRef>,
}

impl Clause {
    /// Returns `true` if the clause contributes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.modules.is_empty()
    }
}

/// The set of devices a device rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "value", rename_all = "lowercase")]
pub enum DeviceClass {
    /// Every device of the platform.
    Any,
    /// Devices whose identifier starts with the given family prefix.
    Prefix(String),
    /// One specific device identifier.
    Exact(String),
}

impl DeviceClass {
    /// Returns `true` if `device` belongs to this class. ASCII case is ignored.
    #[must_use]
    pub fn matches(&self, device: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefix(prefix) => starts_with_ignore_case(device, prefix),
            Self::Exact(id) => device.eq_ignore_ascii_case(id),
        }
    }

    /// Returns `true` if some device identifier is matched by both classes.
    ///
    /// Two rules of one platform whose classes overlap could both match the
    /// same context, so the table would depend on declaration order.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, _) | (_, Self::Any) => true,
            (Self::Prefix(p), Self::Prefix(q)) => {
                starts_with_ignore_case(p, q) || starts_with_ignore_case(q, p)
            }
            (Self::Prefix(p), Self::Exact(d)) | (Self::Exact(d), Self::Prefix(p)) => {
                starts_with_ignore_case(d, p)
            }
            (Self::Exact(d), Self::Exact(e)) => d.eq_ignore_ascii_case(e),
        }
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Prefix(p) => write!(f, "{p}*"),
            Self::Exact(d) => f.write_str(d),
        }
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Selection rule on the platform/device axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRule {
    /// Platform family this rule applies to.
    pub platform: String,
    /// Devices of the platform this rule applies to.
    pub class: DeviceClass,
    /// Contribution when the rule is selected.
    #[serde(default)]
    pub clause: Clause,
    /// Nested action rules, consulted only when this rule is selected.
    #[serde(default)]
    pub actions: Vec<ActionRule>,
}

impl DeviceRule {
    /// Creates a rule for every device of `platform`.
    #[must_use]
    pub fn any(platform: impl Into<String>) -> Self {
        Self::with_class(platform, DeviceClass::Any)
    }

    /// Creates a rule for devices of `platform` starting with `prefix`.
    #[must_use]
    pub fn prefix(platform: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::with_class(platform, DeviceClass::Prefix(prefix.into()))
    }

    /// Creates a rule for one device of `platform`.
    #[must_use]
    pub fn exact(platform: impl Into<String>, device: impl Into<String>) -> Self {
        Self::with_class(platform, DeviceClass::Exact(device.into()))
    }

    fn with_class(platform: impl Into<String>, class: DeviceClass) -> Self {
        Self {
            platform: platform.into(),
            class,
            clause: Clause::default(),
            actions: Vec::new(),
        }
    }

    /// Appends files to the rule's contribution.
    #[must_use]
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clause.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Appends a module reference to the rule's contribution.
    #[must_use]
    pub fn module(mut self, module: ModuleRef) -> Self {
        self.clause.modules.push(module);
        self
    }

    /// Appends a nested action rule.
    #[must_use]
    pub fn action(mut self, rule: ActionRule) -> Self {
        self.actions.push(rule);
        self
    }

    /// Returns `true` if the rule applies to the platform and device.
    #[must_use]
    pub fn matches(&self, platform: &str, device: &str) -> bool {
        self.platform.eq_ignore_ascii_case(platform) && self.class.matches(device)
    }
}

/// Selection rule on the action axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRule {
    /// Action this rule applies to.
    pub action: Action,
    /// Contribution when the rule is selected.
    #[serde(default)]
    pub clause: Clause,
    /// Backend rules, consulted for simulation runs only.
    #[serde(default)]
    pub backends: Vec<BackendRule>,
}

impl ActionRule {
    /// Creates an empty rule for `action`.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            clause: Clause::default(),
            backends: Vec::new(),
        }
    }

    /// Appends files to the rule's contribution.
    #[must_use]
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clause.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Appends a backend rule.
    #[must_use]
    pub fn backend(mut self, rule: BackendRule) -> Self {
        self.backends.push(rule);
        self
    }
}

/// Selection rule on the simulator backend axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRule {
    /// Backend name, compared ignoring ASCII case.
    pub backend: String,
    /// Contribution when the rule is selected.
    #[serde(default)]
    pub clause: Clause,
}

impl BackendRule {
    /// Creates a backend rule contributing `files`.
    #[must_use]
    pub fn new<I, S>(backend: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            backend: backend.into(),
            clause: Clause {
                files: files.into_iter().map(Into::into).collect(),
                modules: Vec::new(),
            },
        }
    }
}

/// A named optional file enabled by a variant selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Selector name.
    pub name: String,
    /// File contributed when selected.
    pub file: String,
}

/// A module's complete declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    /// Module name.
    pub name: String,
    /// Always-included contribution.
    pub base: Clause,
    /// Device rules, first match wins.
    pub devices: Vec<DeviceRule>,
    /// Module-level action rules, first match wins.
    pub actions: Vec<ActionRule>,
    /// Variant table; `None` when the module declares none.
    pub variants: Option<Vec<Variant>>,
}

impl Descriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends base files.
    #[must_use]
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Appends a base module reference.
    #[must_use]
    pub fn module(mut self, module: ModuleRef) -> Self {
        self.base.modules.push(module);
        self
    }

    /// Appends a device rule.
    #[must_use]
    pub fn device(mut self, rule: DeviceRule) -> Self {
        self.devices.push(rule);
        self
    }

    /// Appends a module-level action rule.
    #[must_use]
    pub fn action(mut self, rule: ActionRule) -> Self {
        self.actions.push(rule);
        self
    }

    /// Adds an entry to the variant table, declaring the table if needed.
    #[must_use]
    pub fn variant(mut self, name: impl Into<String>, file: impl Into<String>) -> Self {
        self.variants.get_or_insert_with(Vec::new).push(Variant {
            name: name.into(),
            file: file.into(),
        });
        self
    }

    /// Looks up a variant by selector name.
    #[must_use]
    pub fn find_variant(&self, name: &str) -> Option<&Variant> {
        self.variants.as_deref()?.iter().find(|v| v.name == name)
    }
}
