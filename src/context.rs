use crate::config::Config;
use crate::remote::RemoteExec;
use crate::session::Session;
use crate::vcs::Vcs;

/// Resolved configuration plus the external tools a command talks to.
pub struct Context<'a> {
    pub config: &'a Config,
    pub vcs: &'a dyn Vcs,
    pub session: &'a dyn Session,
    pub remote: &'a dyn RemoteExec,
}
