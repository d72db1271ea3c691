//! Storage classes.
//!
//! Every boolean property a declaration can carry lives in one 64-bit
//! [`StorageClass`] set. The flags and their accessors are generated from a
//! single table so that each accessor is exactly one bit test.
//!
//! The set does not enforce exclusivity (`in` vs `out` vs `ref`, the three
//! safety tiers). Semantic analysis enforces those rules.

use bitflags::bitflags;

macro_rules! storage_classes {
    ($( $(#[doc = $doc:literal])* $flag:ident = $bit:literal, $accessor:ident, $keyword:literal; )*) => {
        bitflags! {
            /// Storage-class and attribute bits of a declaration.
            #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
            pub struct StorageClass: u64 {
                $( $(#[doc = $doc])* const $flag = 1 << $bit; )*
            }
        }

        impl StorageClass {
            $(
                #[doc = concat!("Whether the `", $keyword, "` bit is set.")]
                #[inline]
                pub const fn $accessor(self) -> bool {
                    self.bits() & Self::$flag.bits() != 0
                }
            )*

            /// Every flag with its source keyword, in bit order.
            pub const CATALOGUE: &'static [(StorageClass, &'static str)] = &[
                $( (Self::$flag, $keyword), )*
            ];

            #[cfg(test)]
            pub(crate) const ACCESSORS: &'static [(StorageClass, fn(StorageClass) -> bool)] = &[
                $( (Self::$flag, Self::$accessor), )*
            ];
        }
    };
}

storage_classes! {
    STATIC = 0, is_static, "static";
    EXTERN = 1, is_extern, "extern";
    CONST = 2, is_const, "const";
    FINAL = 3, is_final, "final";
    ABSTRACT = 4, is_abstract, "abstract";
    /// Function parameter.
    PARAMETER = 5, is_parameter, "parameter";
    /// Aggregate field.
    FIELD = 6, is_field, "field";
    OVERRIDE = 7, is_override, "override";
    AUTO = 8, is_auto, "auto";
    SYNCHRONIZED = 9, is_synchronized, "synchronized";
    DEPRECATED = 10, is_deprecated, "deprecated";
    IN = 11, is_in, "in";
    OUT = 12, is_out, "out";
    LAZY = 13, is_lazy, "lazy";
    /// Variable declared by a `foreach` statement.
    FOREACH = 14, is_foreach, "foreach";
    /// Typesafe variadic parameter.
    VARIADIC = 16, is_variadic, "variadic";
    /// Field may only be initialized in a constructor.
    CTORINIT = 17, is_ctorinit, "ctorinit";
    TEMPLATEPARAMETER = 18, is_template_parameter, "templateparameter";
    SCOPE = 19, is_scope, "scope";
    IMMUTABLE = 20, is_immutable, "immutable";
    REF = 21, is_ref, "ref";
    /// Has an explicit initializer.
    INIT = 22, is_init, "init";
    /// Manifest constant; never occupies storage.
    MANIFEST = 23, is_manifest, "manifest";
    /// Do not run the destructor.
    NODTOR = 24, is_nodtor, "nodtor";
    NOTHROW = 25, is_nothrow, "nothrow";
    PURE = 26, is_pure, "pure";
    /// Thread-local storage.
    TLS = 27, is_tls, "tls";
    /// Template alias parameter.
    ALIAS = 28, is_alias_param, "alias";
    SHARED = 29, is_shared, "shared";
    /// Global, unsynchronised, not thread-local.
    GSHARED = 30, is_gshared, "__gshared";
    WILD = 31, is_wild, "inout";
    PROPERTY = 32, is_property, "@property";
    SAFE = 33, is_safe, "@safe";
    TRUSTED = 34, is_trusted, "@trusted";
    SYSTEM = 35, is_system, "@system";
    /// Only usable during compile-time evaluation.
    CTFE = 36, is_ctfe, "ctfe";
    DISABLE = 37, is_disable, "@disable";
    /// Synthesized result variable of an out-contract.
    RESULT = 38, is_result, "result";
    NODEFAULTCTOR = 39, is_nodefaultctor, "nodefaultctor";
    /// Compiler temporary.
    TEMP = 40, is_temp, "temp";
    RVALUE = 41, is_rvalue, "rvalue";
    NOGC = 42, is_nogc, "@nogc";
    VOLATILE = 43, is_volatile, "volatile";
    RETURN = 44, is_return, "return";
    AUTOREF = 45, is_autoref, "auto ref";
    /// Attributes of this function are inferred from its body.
    INFERENCE = 46, is_inference, "inference";
    /// Temporary whose lifetime ends with the enclosing expression.
    EXPTEMP = 47, is_exptemp, "exptemp";
    MAYBESCOPE = 48, is_maybescope, "maybescope";
    SCOPEINFERRED = 49, is_scope_inferred, "scopeinferred";
    FUTURE = 50, is_future, "@future";
    LOCAL = 51, is_local, "local";
}

impl StorageClass {
    /// Type constructors: the bits that become type modifiers.
    pub const TYPECTOR: Self = Self::from_bits_truncate(
        Self::CONST.bits() | Self::IMMUTABLE.bits() | Self::SHARED.bits() | Self::WILD.bits(),
    );

    /// Safety tiers.
    pub const SAFETY: Self = Self::from_bits_truncate(
        Self::SAFE.bits() | Self::TRUSTED.bits() | Self::SYSTEM.bits(),
    );

    /// Attributes that become part of a function's type.
    pub const FUNCATTR: Self = Self::from_bits_truncate(
        Self::REF.bits()
            | Self::NOTHROW.bits()
            | Self::NOGC.bits()
            | Self::PURE.bits()
            | Self::PROPERTY.bits()
            | Self::SAFETY.bits(),
    );

    /// Storage classes proper, as opposed to type constructors and
    /// function attributes.
    pub const STORAGE_CLASS: Self = Self::from_bits_truncate(
        Self::AUTO.bits()
            | Self::SCOPE.bits()
            | Self::STATIC.bits()
            | Self::EXTERN.bits()
            | Self::CONST.bits()
            | Self::FINAL.bits()
            | Self::ABSTRACT.bits()
            | Self::SYNCHRONIZED.bits()
            | Self::DEPRECATED.bits()
            | Self::FUTURE.bits()
            | Self::OVERRIDE.bits()
            | Self::LAZY.bits()
            | Self::ALIAS.bits()
            | Self::OUT.bits()
            | Self::IN.bits()
            | Self::MANIFEST.bits()
            | Self::IMMUTABLE.bits()
            | Self::SHARED.bits()
            | Self::WILD.bits()
            | Self::NOTHROW.bits()
            | Self::NOGC.bits()
            | Self::PURE.bits()
            | Self::REF.bits()
            | Self::RETURN.bits()
            | Self::TLS.bits()
            | Self::GSHARED.bits()
            | Self::PROPERTY.bits()
            | Self::SAFETY.bits()
            | Self::DISABLE.bits()
            | Self::LOCAL.bits(),
    );

    /// Keyword spelling of every flag in the set, in bit order.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        Self::CATALOGUE
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|&(_, keyword)| keyword)
    }
}

impl Default for StorageClass {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Type modifiers, as seen by the `this` reference of a member function.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeMod: u8 {
        const CONST = 1 << 0;
        const IMMUTABLE = 1 << 1;
        const SHARED = 1 << 2;
        const WILD = 1 << 3;
    }
}

impl TypeMod {
    /// `inout const`
    pub const WILD_CONST: Self = Self::from_bits_truncate(Self::WILD.bits() | Self::CONST.bits());

    /// Extract the modifiers carried by a storage class.
    pub const fn from_stc(stc: StorageClass) -> Self {
        let mut bits = 0;
        if stc.is_const() {
            bits |= Self::CONST.bits();
        }
        if stc.is_immutable() {
            bits |= Self::IMMUTABLE.bits();
        }
        if stc.is_shared() {
            bits |= Self::SHARED.bits();
        }
        if stc.is_wild() {
            bits |= Self::WILD.bits();
        }
        Self::from_bits_truncate(bits)
    }

    /// Whether a reference with modifiers `self` implicitly converts to one
    /// with modifiers `to`.
    ///
    /// Identical modifiers always convert. Otherwise only conversions that
    /// add `const` are allowed; `shared` must agree on both sides unless the
    /// source is `immutable`.
    pub fn implicit_conv(self, to: Self) -> bool {
        if self == to {
            return true;
        }
        let same_sharing = self.contains(Self::SHARED) == to.contains(Self::SHARED);
        let from = self - Self::SHARED;
        let target = to - Self::SHARED;
        if from == Self::IMMUTABLE {
            return target == Self::CONST || target == Self::WILD_CONST;
        }
        let adds_const = (target == Self::CONST
            && (from.is_empty() || from == Self::WILD || from == Self::WILD_CONST))
            || (target == Self::WILD_CONST && from == Self::WILD);
        adds_const && same_sharing
    }
}
