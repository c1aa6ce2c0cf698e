//! The unnormalized symbol tree produced by the header front-end.
//!
//! Children are plain lists here; ingestion turns them into keyed scopes.

use crate::error::Result;
use crate::item::{Access, LiteralValue};
use cxxbind_common::Location;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTree {
    pub root: RawNamespace,
    #[serde(default)]
    pub macros: IndexMap<String, RawMacro>,
}

impl RawTree {
    /// Decode a tree from its JSON interchange form.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNamespace {
    pub name: String,
    pub location: Option<Location>,
    pub brief_comment: String,
    pub namespaces: Vec<RawNamespace>,
    pub classes: Vec<RawClass>,
    pub enums: Vec<RawEnum>,
    pub typedefs: Vec<RawTypedef>,
    pub variables: Vec<RawVariable>,
    pub functions: Vec<RawFunction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawClass {
    pub name: String,
    pub location: Option<Location>,
    pub brief_comment: String,
    /// Base class spellings as written.
    pub supers: Vec<String>,
    pub classes: Vec<RawClass>,
    pub enums: Vec<RawEnum>,
    pub typedefs: Vec<RawTypedef>,
    pub variables: Vec<RawVariable>,
    pub methods: Vec<RawMethod>,
    pub constructors: Vec<RawMethod>,
    pub destructor: Option<RawMethod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFunction {
    pub name: String,
    pub location: Option<Location>,
    pub brief_comment: String,
    pub ret_type: String,
    pub args: Vec<RawVariable>,
    pub calling_convention: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMethod {
    #[serde(flatten)]
    pub function: RawFunction,
    pub access: Access,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVariable {
    pub name: String,
    pub location: Option<Location>,
    pub brief_comment: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub is_const: bool,
    pub is_static: bool,
    pub value: Option<LiteralValue>,
    pub literal: Option<String>,
    pub access: Access,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEnum {
    pub name: String,
    pub location: Option<Location>,
    pub brief_comment: String,
    #[serde(rename = "type")]
    pub underlying: String,
    pub is_strong_typed: bool,
    pub values: Vec<RawVariable>,
}

impl Default for RawEnum {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: None,
            brief_comment: String::new(),
            underlying: "int".to_string(),
            is_strong_typed: false,
            values: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTypedef {
    pub name: String,
    pub location: Option<Location>,
    pub brief_comment: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMacro {
    pub location: Option<Location>,
    pub definition: String,
}
