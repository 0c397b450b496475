//! Receiver programs that ship with the ledger
//!
//! These are plain data, so a deployment holding them can be saved and
//! reloaded by the storage layer and driven from the CLI.

use crate::contract::receiver::{ApprovalCall, ApprovalReceiver};
use crate::contract::registry::ContractError;
use crate::runtime::Runtime;
use crate::token::TokenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinReceiver {
    /// Pulls the approved amount into itself
    Collector,
    /// Burns the approved amount from the owner
    Burner,
    /// Refuses every approval
    Rejecter,
}

impl ApprovalReceiver for BuiltinReceiver {
    fn receive_approval(
        &self,
        runtime: &mut Runtime,
        call: ApprovalCall<'_>,
    ) -> Result<(), TokenError> {
        match self {
            BuiltinReceiver::Collector => {
                runtime.transfer_from(call.receiver, call.from, call.receiver, call.value)
            }
            BuiltinReceiver::Burner => runtime.burn_from(call.receiver, call.from, call.value),
            BuiltinReceiver::Rejecter => Err(TokenError::ReceiverRejected(format!(
                "{} refuses approvals",
                call.receiver
            ))),
        }
    }

    fn builtin(&self) -> Option<BuiltinReceiver> {
        Some(*self)
    }
}

impl fmt::Display for BuiltinReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinReceiver::Collector => "collector",
            BuiltinReceiver::Burner => "burner",
            BuiltinReceiver::Rejecter => "rejecter",
        };
        f.write_str(name)
    }
}

impl FromStr for BuiltinReceiver {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "collector" => Ok(BuiltinReceiver::Collector),
            "burner" => Ok(BuiltinReceiver::Burner),
            "rejecter" => Ok(BuiltinReceiver::Rejecter),
            other => Err(ContractError::UnknownReceiver(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Address;
    use crate::token::{unit, TokenEvent};
    use std::rc::Rc;

    fn setup(kind: BuiltinReceiver) -> (Runtime, Address, Address) {
        let alice = Address::new("alice");
        let mut runtime = Runtime::deploy(&alice, 1_000, "Manual Token", "MT").unwrap();
        let receiver = runtime.deploy_receiver(&alice, Rc::new(kind)).unwrap();
        (runtime, alice, receiver)
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(
            "Collector".parse::<BuiltinReceiver>().unwrap(),
            BuiltinReceiver::Collector
        );
        assert_eq!(
            "burner".parse::<BuiltinReceiver>().unwrap(),
            BuiltinReceiver::Burner
        );
        assert!(matches!(
            "vault".parse::<BuiltinReceiver>(),
            Err(ContractError::UnknownReceiver(_))
        ));
        assert_eq!(BuiltinReceiver::Rejecter.to_string(), "rejecter");
    }

    #[test]
    fn test_collector_pulls_approved_amount() {
        let (mut runtime, alice, collector) = setup(BuiltinReceiver::Collector);

        runtime
            .approve_and_call(&alice, &collector, 40 * unit(), b"")
            .unwrap();

        assert_eq!(runtime.balance_of(&collector), 40 * unit());
        assert_eq!(runtime.allowance(&alice, &collector), 0);
        assert_eq!(runtime.balance_of(&alice), 960 * unit());
    }

    #[test]
    fn test_burner_destroys_approved_amount() {
        let (mut runtime, alice, burner) = setup(BuiltinReceiver::Burner);

        runtime
            .approve_and_call(&alice, &burner, 100 * unit(), b"")
            .unwrap();

        assert_eq!(runtime.total_supply(), 900 * unit());
        assert_eq!(runtime.allowance(&alice, &burner), 0);
        assert_eq!(
            runtime.token().events().last(),
            Some(&TokenEvent::transfer(&alice, &Address::zero(), 100 * unit()))
        );
    }

    #[test]
    fn test_rejecter_rolls_back_approval() {
        let (mut runtime, alice, rejecter) = setup(BuiltinReceiver::Rejecter);
        let events_before = runtime.token().events().len();

        let result = runtime.approve_and_call(&alice, &rejecter, 5, b"");

        assert!(matches!(result, Err(TokenError::ReceiverRejected(_))));
        assert_eq!(runtime.allowance(&alice, &rejecter), 0);
        assert_eq!(runtime.token().events().len(), events_before);
    }
}
