//! Access control and calling conventions.

use std::fmt;

/// Access-control level of a declaration.
///
/// Ordered from least to most visible. `Undefined` means "not written";
/// the effective level then comes from the enclosing aggregate.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Undefined,
    None,
    Private,
    Package,
    Protected,
    Public,
    Export,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Undefined => "undefined",
            Visibility::None => "none",
            Visibility::Private => "private",
            Visibility::Package => "package",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
            Visibility::Export => "export",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External calling convention and mangling scheme.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Linkage {
    #[default]
    D,
    C,
    Cpp,
    Windows,
    ObjC,
    System,
}

impl Linkage {
    pub fn as_str(self) -> &'static str {
        match self {
            Linkage::D => "D",
            Linkage::C => "C",
            Linkage::Cpp => "C++",
            Linkage::Windows => "Windows",
            Linkage::ObjC => "Objective-C",
            Linkage::System => "System",
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
