pub(crate) mod home;
pub(crate) mod login;
pub(crate) mod report;
