use bazaar_domain::IdentityRecord;

/// A view that may only render for an authenticated identity.
pub trait ProtectedView: Send + Sync + 'static {
    /// What rendering produces.
    type Output;

    /// Renders the view for `identity`.
    fn render(&self, identity: &IdentityRecord) -> Self::Output;
}

impl<F, O> ProtectedView for F
where
    F: Fn(&IdentityRecord) -> O + Send + Sync + 'static,
{
    type Output = O;

    fn render(&self, identity: &IdentityRecord) -> O {
        self(identity)
    }
}
