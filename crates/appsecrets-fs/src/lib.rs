//! File-backed secret loading. Each secret is a plain file under a root
//! directory, the layout Kubernetes uses for mounted Secret volumes.

pub mod file_loader;
