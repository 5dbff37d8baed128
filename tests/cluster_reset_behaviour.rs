//! Behavioural scenarios for resetting a PostgreSQL cluster.

mod cluster_reset;
