//! Pipeline tests against in-process collaborators.
