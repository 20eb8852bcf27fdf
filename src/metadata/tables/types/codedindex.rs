use strum::{EnumCount, EnumIter};

use crate::{
    metadata::{tables::types::TableId, token::Token},
    Result,
};

/// Represents all possible coded index types
///
/// A coded index packs a table selector (the tag, in the low bits) and a one-based row index
/// (in the remaining bits) into a single column. The number of tag bits depends on how many
/// tables the coded index can refer to.
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6
///
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef`, `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param`, `Property`
    HasConstant,
    /// `MethodDef`, `Field`, `TypeRef`, `TypeDef`, `Param`, `InterfaceImpl`, `MemberRef`, `Module`, `Permission`,
    /// `Property`, `Event`, `StandAloneSig`, `ModuleRef`, `TypeSpec`, `Assembly`, `AssemblyRef`, `File`, `ExportedType`,
    /// `ManifestResource`, `GenericParam`, `GenericParamConstraint`, `MethodSpec`
    HasCustomAttribute,
    /// `Field`, `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef`, `Assembly`
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, `TypeSpec`
    MemberRefParent,
    /// `Event`, `Property`
    HasSemantics,
    /// `MethodDef`, `MemberRef`
    MethodDefOrRef,
    /// `Field`, `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef`, `ExportedType`
    Implementation,
    /// `MethodDef`, `MemberRef`
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef`, `TypeRef`
    ResolutionScope,
    /// `TypeDef`, `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// Lookup table for coded combinations of the various types and their table IDs, indexed by tag
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity, // In the standard PDF, this is wrongly labeled as 'Permission' (although no such table exists)
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            // Tags 0, 1 and 4 are 'not used'; they still count towards the tag width
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Number of low bits used for the table tag
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        let count = self.tables().len();
        usize::BITS - (count - 1).leading_zeros()
    }

    /// Splits a raw coded value into its table and one-based row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag does not select a table of this coded index.
    pub fn decode(&self, value: u32) -> Result<(TableId, u32)> {
        let bits = self.tag_bits();
        let tag = (value & ((1 << bits) - 1)) as usize;
        match self.tables().get(tag) {
            Some(table) => Ok((*table, value >> bits)),
            None => Err(malformed_error!(
                "Invalid tag {} for coded index {:?}",
                tag,
                self
            )),
        }
    }
}

/// The decoded version of a coded-index
#[derive(Clone, Debug, PartialEq)]
pub struct CodedIndex {
    /// The `TableId` this index is referring to
    pub tag: TableId,
    /// The one-based row id that this `CodedIndex` is pointing to
    pub row: u32,
    /// The token in that `TableId`, that this `CodedIndex` is referring to
    pub token: Token,
}

impl CodedIndex {
    /// Create a new `CodedIndex`
    ///
    /// ## Arguments
    /// * `tag` - The `TableId` to encode
    /// * `row` - The one-based row to encode
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::new(tag.token_base() | (row & 0x00FF_FFFF)),
        }
    }

    /// Decode a raw coded value of the given kind
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag is not valid for `ci_type`.
    pub fn from_raw(value: u32, ci_type: CodedIndexType) -> Result<CodedIndex> {
        let (tag, row) = ci_type.decode(value)?;
        Ok(CodedIndex::new(tag, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn tag_bits() {
        assert_eq!(CodedIndexType::TypeDefOrRef.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasConstant.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasCustomAttribute.tag_bits(), 5);
        assert_eq!(CodedIndexType::HasFieldMarshal.tag_bits(), 1);
        assert_eq!(CodedIndexType::HasDeclSecurity.tag_bits(), 2);
        assert_eq!(CodedIndexType::MemberRefParent.tag_bits(), 3);
        assert_eq!(CodedIndexType::HasSemantics.tag_bits(), 1);
        assert_eq!(CodedIndexType::MethodDefOrRef.tag_bits(), 1);
        assert_eq!(CodedIndexType::MemberForwarded.tag_bits(), 1);
        assert_eq!(CodedIndexType::Implementation.tag_bits(), 2);
        assert_eq!(CodedIndexType::CustomAttributeType.tag_bits(), 3);
        assert_eq!(CodedIndexType::ResolutionScope.tag_bits(), 2);
        assert_eq!(CodedIndexType::TypeOrMethodDef.tag_bits(), 1);
        assert_eq!(CodedIndexType::iter().count(), CodedIndexType::COUNT);
    }

    #[test]
    fn decode() {
        let coded = CodedIndex::from_raw(0x0000_0015, CodedIndexType::TypeDefOrRef).unwrap();
        assert_eq!(coded.tag, TableId::TypeRef);
        assert_eq!(coded.row, 5);
        assert_eq!(coded.token.value(), 0x0100_0005);

        let coded = CodedIndex::from_raw(0x0000_0006, CodedIndexType::Implementation).unwrap();
        assert_eq!(coded.tag, TableId::ExportedType);
        assert_eq!(coded.row, 1);

        assert!(CodedIndex::from_raw(0x0000_0007, CodedIndexType::TypeDefOrRef).is_err());
        assert!(CodedIndex::from_raw(0x0000_0003, CodedIndexType::Implementation).is_err());
    }
}
