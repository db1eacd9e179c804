//! Intent construction and ordering validation
//!
//! Builders are stateless, one-shot constructors: parameters in, immutable
//! [`TransactionIntent`] out. Validation happens here, synchronously, so a
//! bad intent never reaches the signer. Publish intents always chain a
//! transfer of the upgrade capability back to the sender, since a package
//! published without capturing that capability can never be upgraded.

use crate::intent::args::{ArgKind, CallArg};
use crate::intent::errors::IntentError;
use crate::types::{ObjectId, SuiAddress};
use nonempty::NonEmpty;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Fully qualified Move call target: `package::module::function`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTarget {
    package: ObjectId,
    module: String,
    function: String,
}

impl MoveTarget {
    pub fn new(package: ObjectId, module: &str, function: &str) -> Result<Self, IntentError> {
        let valid_ident = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !s.starts_with(|c: char| c.is_ascii_digit())
        };
        if !valid_ident(module) || !valid_ident(function) {
            return Err(IntentError::InvalidTarget {
                target: format!("{}::{}::{}", package, module, function),
                reason: "module and function must be Move identifiers".to_string(),
            });
        }
        Ok(Self {
            package,
            module: module.to_string(),
            function: function.to_string(),
        })
    }

    /// Parse a `0x..::module::function` path.
    pub fn parse(target: &str) -> Result<Self, IntentError> {
        let mut parts = target.split("::");
        let (package, module, function) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(m), Some(f)) => (p, m, f),
            _ => {
                return Err(IntentError::InvalidTarget {
                    target: target.to_string(),
                    reason: "expected package::module::function".to_string(),
                })
            }
        };
        if parts.next().is_some() {
            return Err(IntentError::InvalidTarget {
                target: target.to_string(),
                reason: "too many path segments".to_string(),
            });
        }
        let package = SuiAddress::parse(package)?;
        Self::new(package, module, function)
    }

    pub fn package(&self) -> &ObjectId {
        &self.package
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// Package-agnostic `module::function` key used for signature lookup.
    pub fn entry_key(&self) -> String {
        format!("{}::{}", self.module, self.function)
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Reference to the result of an earlier command in the same intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult(pub u16);

/// One step of a transaction intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Invoke a Move entry function
    MoveCall {
        target: MoveTarget,
        args: SmallVec<[CallArg; 8]>,
    },

    /// Publish compiled bytecode modules; produces the upgrade capability
    /// as the command result
    Publish {
        modules: NonEmpty<Vec<u8>>,
        dependencies: Vec<ObjectId>,
    },

    /// Transfer earlier command results to a recipient
    TransferObjects {
        objects: Vec<StepResult>,
        recipient: SuiAddress,
    },
}

/// A fully specified, not-yet-submitted ledger operation.
///
/// Immutable once built and consumed exactly once by submission. Field order
/// and argument order are fixed, so [`TransactionIntent::canonical_bytes`]
/// is deterministic: identical logical parameters produce byte-identical
/// encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    sender: SuiAddress,
    commands: SmallVec<[Command; 2]>,
    gas_budget: Option<u64>,
}

impl TransactionIntent {
    pub fn sender(&self) -> &SuiAddress {
        &self.sender
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn gas_budget(&self) -> Option<u64> {
        self.gas_budget
    }

    /// Whether this intent publishes a package.
    pub fn is_publish(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, Command::Publish { .. }))
    }

    /// Deterministic byte encoding of the whole intent.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("intent types are bincode-serializable")
    }
}

/// Known entry-function signatures, keyed package-agnostically.
///
/// The builder only supports targets it has a signature for; anything else
/// is rejected before any network call.
static SIGNATURES: Lazy<HashMap<&'static str, &'static [ArgKind]>> = Lazy::new(|| {
    use ArgKind::*;
    let mut table: HashMap<&'static str, &'static [ArgKind]> = HashMap::new();
    table.insert(
        "basic_nft::mint_game_nft",
        &[Str, Str, Str, U64, U64, U8] as &[ArgKind],
    );
    table.insert("basic_nft::level_up", &[Object]);
    table.insert("basic_nft::transfer_nft", &[Object, Address]);
    table.insert("marketplace::list_nft", &[Object, Object, U64]);
    table.insert("marketplace::purchase_nft", &[Object, Address, Object]);
    table
});

/// Look up the declared signature for a target.
pub fn signature_of(target: &MoveTarget) -> Option<&'static [ArgKind]> {
    SIGNATURES.get(target.entry_key().as_str()).copied()
}

/// Build an intent invoking a known Move entry function.
///
/// Fails with a validation error if the target is unknown, or the argument
/// count or positional kinds disagree with the declared signature.
pub fn build_move_call(
    sender: SuiAddress,
    target: MoveTarget,
    args: Vec<CallArg>,
    gas_budget: Option<u64>,
) -> Result<TransactionIntent, IntentError> {
    let signature =
        signature_of(&target).ok_or_else(|| IntentError::UnknownTarget(target.entry_key()))?;

    if args.len() != signature.len() {
        return Err(IntentError::ArgumentCount {
            target: target.entry_key(),
            expected: signature.len(),
            actual: args.len(),
        });
    }

    for (index, (arg, expected)) in args.iter().zip(signature.iter()).enumerate() {
        if arg.kind() != *expected {
            return Err(IntentError::ArgumentKind {
                target: target.entry_key(),
                index,
                expected: *expected,
                actual: arg.kind(),
            });
        }
    }

    let mut commands = SmallVec::new();
    commands.push(Command::MoveCall {
        target,
        args: args.into_iter().collect(),
    });

    Ok(TransactionIntent {
        sender,
        commands,
        gas_budget,
    })
}

/// Build a package-publish intent.
///
/// The publish step's result is the upgrade capability object; the intent
/// transfers it to the sender in the same atomic step list.
pub fn build_publish(
    sender: SuiAddress,
    modules: Vec<Vec<u8>>,
    dependencies: Vec<ObjectId>,
    gas_budget: Option<u64>,
) -> Result<TransactionIntent, IntentError> {
    let modules = NonEmpty::from_vec(modules).ok_or(IntentError::EmptyModules)?;

    let mut commands = SmallVec::new();
    commands.push(Command::Publish {
        modules,
        dependencies,
    });
    commands.push(Command::TransferObjects {
        objects: vec![StepResult(0)],
        recipient: sender.clone(),
    });

    let intent = TransactionIntent {
        sender,
        commands,
        gas_budget,
    };
    debug_assert!(sanity_check_publish_pairing(&intent).is_ok());
    Ok(intent)
}

/// Validate that every publish command is paired with a transfer of its
/// result back to the sender.
///
/// `build_publish` establishes this by construction; the check exists so
/// tests (and debug builds) can assert no other code path produces a
/// publish intent that leaks the upgrade capability.
pub fn sanity_check_publish_pairing(intent: &TransactionIntent) -> Result<(), IntentError> {
    for (idx, command) in intent.commands().iter().enumerate() {
        if matches!(command, Command::Publish { .. }) {
            let step = StepResult(idx as u16);
            let paired = intent.commands().iter().skip(idx + 1).any(|c| match c {
                Command::TransferObjects { objects, recipient } => {
                    objects.contains(&step) && recipient == intent.sender()
                }
                _ => false,
            });
            if !paired {
                return Err(IntentError::InvalidTarget {
                    target: "publish".to_string(),
                    reason: "publish step without capability transfer".to_string(),
                });
            }
        }
    }
    Ok(())
}
