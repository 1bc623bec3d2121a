//! Function and event definitions
//!
//! Definitions are built once (usually by an external ABI loader) and are
//! immutable afterwards. Signatures, selectors and topics are computed on
//! first use and memoised.

use std::fmt;
use std::sync::OnceLock;

use ethers_core::types::H256;
use serde::{Deserialize, Serialize};

use super::selector::{selector, topic};
use super::types::{SolidityType, TypeError};
use super::value::AbiValue;
use super::AbiError;

/// A typed parameter of a function or event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParamEntry", into = "ParamEntry")]
pub struct Param {
    /// Parameter name (can be empty)
    pub name: String,
    /// Type name as declared
    pub type_name: String,
    /// Parsed type
    pub kind: SolidityType,
    /// Whether the parameter is indexed (events only)
    pub indexed: bool,
    /// Named members of a `tuple` parameter
    pub components: Vec<Param>,
}

/// Wire shape of a parameter:
/// `{"name": "...", "type": "...", "indexed": bool, "components": [...]}`
#[derive(Serialize, Deserialize)]
struct ParamEntry {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    indexed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<ParamEntry>,
}

impl TryFrom<ParamEntry> for Param {
    type Error = TypeError;

    fn try_from(entry: ParamEntry) -> Result<Self, Self::Error> {
        let components = entry
            .components
            .into_iter()
            .map(Param::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let lowered = entry.type_name.trim().to_ascii_lowercase();
        let kind = match lowered.strip_prefix("tuple") {
            // `tuple`, `tuple[]`, `tuple[2]`: the member list lives in `components`
            Some(suffix) => {
                if components.is_empty() {
                    return Err(TypeError::Unknown { raw: entry.type_name });
                }
                let members = components
                    .iter()
                    .map(|c| c.kind.canonical())
                    .collect::<Vec<_>>()
                    .join(",");
                SolidityType::parse(&format!("({members}){suffix}"))?
            }
            None => SolidityType::parse(&entry.type_name)?,
        };

        Ok(Param {
            name: entry.name,
            type_name: entry.type_name,
            kind,
            indexed: entry.indexed,
            components,
        })
    }
}

impl From<Param> for ParamEntry {
    fn from(param: Param) -> Self {
        ParamEntry {
            name: param.name,
            type_name: param.type_name,
            indexed: param.indexed,
            components: param.components.into_iter().map(ParamEntry::from).collect(),
        }
    }
}

impl Param {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Result<Self, TypeError> {
        let type_name = type_name.into();
        let kind = SolidityType::parse(&type_name)?;
        Ok(Param {
            name: name.into(),
            type_name,
            kind,
            indexed: false,
            components: Vec::new(),
        })
    }

    /// An indexed event parameter
    pub fn indexed(name: impl Into<String>, type_name: impl Into<String>) -> Result<Self, TypeError> {
        Ok(Param {
            indexed: true,
            ..Self::new(name, type_name)?
        })
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.indexed {
            write!(f, " indexed")?;
        }
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        Ok(())
    }
}

fn canonical_signature(name: &str, params: &[Param]) -> String {
    let types = params.iter().map(|p| p.kind.canonical()).collect::<Vec<_>>().join(",");
    format!("{name}({types})")
}

fn display_signature(f: &mut fmt::Formatter<'_>, name: &str, params: &[Param]) -> fmt::Result {
    let params = params.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ");
    write!(f, "{name}({params})")
}

/// Split the parameter list out of `name(t1,t2,...)`
fn parse_signature(signature: &str) -> Result<(String, Vec<Param>), AbiError> {
    let invalid = || AbiError::InvalidSignature(signature.to_string());

    let open = signature.find('(').ok_or_else(invalid)?;
    let inner = signature
        .get(open + 1..)
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let name = signature[..open].trim();
    if name.is_empty() {
        return Err(invalid());
    }

    let kinds = match SolidityType::parse(&format!("({inner})"))? {
        SolidityType::Struct(members) => members,
        _ => return Err(invalid()),
    };
    let params = kinds
        .into_iter()
        .map(|kind| Param {
            name: String::new(),
            type_name: kind.canonical(),
            kind,
            indexed: false,
            components: Vec::new(),
        })
        .collect();
    Ok((name.to_string(), params))
}

/// A contract function definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionDef {
    name: String,
    inputs: Vec<Param>,
    #[serde(default)]
    outputs: Vec<Param>,
    #[serde(skip)]
    signature: OnceLock<String>,
    #[serde(skip)]
    selector: OnceLock<[u8; 4]>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        FunctionDef {
            name: name.into(),
            inputs,
            ..Default::default()
        }
    }

    /// Build from a canonical signature such as `transfer(address,uint256)`
    pub fn from_signature(signature: &str) -> Result<Self, AbiError> {
        let (name, inputs) = parse_signature(signature)?;
        Ok(Self::new(name, inputs))
    }

    /// Attach return parameters
    pub fn with_outputs(mut self, outputs: Vec<Param>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Param] {
        &self.outputs
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> &str {
        self.signature.get_or_init(|| canonical_signature(&self.name, &self.inputs))
    }

    /// First four bytes of `keccak256(signature)`
    pub fn selector(&self) -> [u8; 4] {
        *self.selector.get_or_init(|| selector(self.signature()))
    }
}

impl PartialEq for FunctionDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.inputs == other.inputs && self.outputs == other.outputs
    }
}

impl Eq for FunctionDef {}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_signature(f, &self.name, &self.inputs)
    }
}

/// A contract event definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEventDef {
    name: String,
    inputs: Vec<Param>,
    #[serde(default)]
    anonymous: bool,
    #[serde(skip)]
    signature: OnceLock<String>,
    #[serde(skip)]
    topic: OnceLock<H256>,
}

impl LogEventDef {
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        LogEventDef {
            name: name.into(),
            inputs,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn signature(&self) -> &str {
        self.signature.get_or_init(|| canonical_signature(&self.name, &self.inputs))
    }

    /// Full `keccak256(signature)`, the first topic of a non-anonymous log
    pub fn topic(&self) -> H256 {
        *self.topic.get_or_init(|| topic(self.signature()))
    }
}

impl PartialEq for LogEventDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.inputs == other.inputs && self.anonymous == other.anonymous
    }
}

impl Eq for LogEventDef {}

impl fmt::Display for LogEventDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_signature(f, &self.name, &self.inputs)
    }
}

/// A function definition paired with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall<'a> {
    pub function: &'a FunctionDef,
    pub args: Vec<AbiValue>,
}

impl<'a> MethodCall<'a> {
    /// Pair arguments with a definition, checking arity and value shapes
    pub fn new(function: &'a FunctionDef, args: Vec<AbiValue>) -> Result<Self, AbiError> {
        if args.len() != function.inputs.len() {
            return Err(AbiError::ArgumentCount {
                function: function.signature().to_string(),
                expected: function.inputs.len(),
                got: args.len(),
            });
        }
        for (param, arg) in function.inputs.iter().zip(&args) {
            if !arg.matches(&param.kind) {
                return Err(AbiError::TypeMismatch {
                    expected: param.kind.canonical(),
                    got: arg.kind().to_string(),
                });
            }
        }
        Ok(MethodCall { function, args })
    }
}

/// A decoded log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent<'a> {
    pub event: &'a LogEventDef,
    /// Values in declaration order, paired with parameter names
    pub values: Vec<(String, AbiValue)>,
}

impl LogEvent<'_> {
    /// Look up a value by parameter name
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}
