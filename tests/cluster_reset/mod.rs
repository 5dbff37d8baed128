//! Cluster reset scenarios driven by a scripted runner.

mod bdd_steps;
mod scenarios;
mod test_helpers;
