//! Generic parameters of managed types and methods.
//!
//! A [`GenericParameter`] is created once per registry key and may be added to several owners.
//! Each owner it was added to is recorded, and its constraints are appended after the
//! parameter is reachable, which is what lets a constraint refer back to its own parameter.

use std::sync::{Arc, OnceLock, Weak};

use crate::metadata::{
    flags::GenericParamAttributes,
    token::{TableId, Token},
    typesig::TypeSig,
};

/// A vector that holds a list of `GenericParameter`
pub type GenericParamList = boxcar::Vec<GenericParamRc>;
/// A reference to a `GenericParameter`
pub type GenericParamRc = Arc<GenericParameter>;

/// The entity a generic parameter has been added to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericOwner {
    /// A type definition (`TypeDef` token)
    Type(Token),
    /// A method definition (`MethodDef` token)
    Method(Token),
}

impl GenericOwner {
    /// The token of the owning definition
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            GenericOwner::Type(token) | GenericOwner::Method(token) => *token,
        }
    }
}

/// A generic parameter declared on a type or method.
///
/// Identity is the parameter's global index in the source metadata. At most one
/// `GenericParameter` exists per index and registry scope; every owner that declares the index
/// shares the same object.
pub struct GenericParameter {
    /// Token (`GenericParam` table, row = global index + 1)
    pub token: Token,
    /// Global index of the declaration in the source metadata
    pub index: u32,
    /// Position within the declaring container, numbered left-to-right, from zero
    pub number: u16,
    /// Name of the generic parameter
    pub name: String,
    /// Variance and special-constraint flags
    pub flags: GenericParamAttributes,
    /// The owner that first declared this parameter
    pub declared_by: GenericOwner,
    /// Constraint types, appended while the parameter is already registered
    pub constraints: boxcar::Vec<TypeSig>,
    /// Every owner this parameter has been added to, in order
    pub owners: boxcar::Vec<GenericOwner>,
    /// Set once every constraint has been attached
    constrained: OnceLock<()>,
}

impl GenericParameter {
    /// Create a new parameter without constraints or owners
    pub fn new(
        index: u32,
        number: u16,
        name: &str,
        flags: GenericParamAttributes,
        declared_by: GenericOwner,
    ) -> Self {
        GenericParameter {
            token: Token::from_parts(TableId::GENERIC_PARAM, index + 1),
            index,
            number,
            name: name.to_string(),
            flags,
            declared_by,
            constraints: boxcar::Vec::new(),
            owners: boxcar::Vec::new(),
            constrained: OnceLock::new(),
        }
    }

    /// Returns true once all constraints of this parameter have been attached.
    ///
    /// Another thread may observe the parameter through the registry while its constructor is
    /// still resolving constraints; until this returns true, `constraints` can be incomplete.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.constrained.get().is_some()
    }

    /// Mark the constraint list as complete
    pub fn mark_constrained(&self) {
        let _ = self.constrained.set(());
    }

    /// Returns true if declared on a method container
    #[must_use]
    pub fn is_method_level(&self) -> bool {
        matches!(self.declared_by, GenericOwner::Method(_))
    }

    /// Returns true if this parameter has been added to `owner`
    #[must_use]
    pub fn is_owned_by(&self, owner: GenericOwner) -> bool {
        self.owners.iter().any(|(_, o)| *o == owner)
    }

    /// Number of distinct owners this parameter has been added to
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.owners.count()
    }
}

/// A weak reference to a `GenericParameter`, as held by signatures
#[derive(Clone, Debug)]
pub struct GenericParamRef {
    weak_ref: Weak<GenericParameter>,
}

impl GenericParamRef {
    /// Create a new `GenericParamRef` from a strong reference
    pub fn new(strong_ref: &GenericParamRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the parameter, returning None if it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<GenericParamRc> {
        self.weak_ref.upgrade()
    }

    /// Returns true if both references point at the same parameter object
    #[must_use]
    pub fn is(&self, other: &GenericParamRc) -> bool {
        std::ptr::eq(self.weak_ref.as_ptr(), Arc::as_ptr(other))
    }
}

impl PartialEq for GenericParamRef {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.weak_ref, &other.weak_ref)
    }
}

impl std::fmt::Debug for GenericParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericParameter")
            .field("index", &self.index)
            .field("number", &self.number)
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("declared_by", &self.declared_by)
            .field("constraints", &self.constraints.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_index() {
        let param = GenericParameter::new(
            41,
            0,
            "T",
            GenericParamAttributes::COVARIANT,
            GenericOwner::Type(Token::new(0x02000003)),
        );
        assert_eq!(param.token.table(), TableId::GENERIC_PARAM);
        assert_eq!(param.token.row(), 42);
        assert!(!param.is_method_level());
    }

    #[test]
    fn test_owners() {
        let owner = GenericOwner::Method(Token::new(0x06000010));
        let param = GenericParameter::new(0, 0, "U", GenericParamAttributes::empty(), owner);
        assert!(!param.is_owned_by(owner));
        param.owners.push(owner);
        assert!(param.is_owned_by(owner));
        assert_eq!(param.owner_count(), 1);
        assert!(param.is_method_level());
    }

    #[test]
    fn test_ref_identity() {
        let a = Arc::new(GenericParameter::new(
            0,
            0,
            "T",
            GenericParamAttributes::empty(),
            GenericOwner::Type(Token::new(0x02000001)),
        ));
        let b = Arc::new(GenericParameter::new(
            0,
            0,
            "T",
            GenericParamAttributes::empty(),
            GenericOwner::Type(Token::new(0x02000001)),
        ));
        let r = GenericParamRef::new(&a);
        assert!(r.is(&a));
        assert!(!r.is(&b));
        assert_eq!(r, GenericParamRef::new(&a));
        drop(a);
        assert!(r.upgrade().is_none());
    }
}
