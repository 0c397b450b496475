//! The approval-notification capability

use crate::contract::builtin::BuiltinReceiver;
use crate::core::Address;
use crate::runtime::Runtime;
use crate::token::TokenError;
use std::rc::Rc;

/// Arguments delivered to a receiver by `approve_and_call`
#[derive(Clone, Copy, Debug)]
pub struct ApprovalCall<'a> {
    /// The receiver's own address (the approved spender)
    pub receiver: &'a Address,
    /// Owner that granted the allowance
    pub from: &'a Address,
    /// Amount approved
    pub value: u128,
    /// Ledger identity
    pub token: &'a Address,
    /// Opaque caller-supplied payload
    pub extra_data: &'a [u8],
}

/// A deployed program that can be notified of approvals
///
/// The callback runs while the approval is already visible and gets full
/// access to the runtime, so it may spend the allowance or call any other
/// operation before `approve_and_call` returns. Returning an error rolls
/// back the whole `approve_and_call`.
pub trait ApprovalReceiver {
    fn receive_approval(
        &self,
        runtime: &mut Runtime,
        call: ApprovalCall<'_>,
    ) -> Result<(), TokenError>;

    /// Serializable form, if this receiver can be persisted
    fn builtin(&self) -> Option<BuiltinReceiver> {
        None
    }
}

impl<F> ApprovalReceiver for F
where
    F: Fn(&mut Runtime, ApprovalCall<'_>) -> Result<(), TokenError>,
{
    fn receive_approval(
        &self,
        runtime: &mut Runtime,
        call: ApprovalCall<'_>,
    ) -> Result<(), TokenError> {
        self(runtime, call)
    }
}

/// Wrap a closure as a deployable receiver
pub fn from_fn<F>(f: F) -> Rc<dyn ApprovalReceiver>
where
    F: Fn(&mut Runtime, ApprovalCall<'_>) -> Result<(), TokenError> + 'static,
{
    Rc::new(f)
}
