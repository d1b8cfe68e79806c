pub(crate) mod cluster_model;
pub(crate) mod record;
