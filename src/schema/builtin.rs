//! # Built-in Registry Data
//!
//! The CRM data set this explorer ships against: table groups, known
//! foreign keys, label lookups, and the permanent visibility filter on
//! `leads`. Kept as plain data so the compiler and engine stay free of
//! table-specific logic.

use super::registry::SchemaRegistry;
use super::types::{ForeignKeyRef, LookupSpec};

impl SchemaRegistry {
    /// The built-in registry for the CRM database.
    pub fn builtin() -> Self {
        let mut registry = SchemaRegistry::new()
            .with_group(
                "CRM - Leads",
                [
                    "leads",
                    "lead_phones",
                    "lead_logs",
                    "lead_notes",
                    "lead_tasks",
                    "lead_messages",
                ],
            )
            .with_group("CRM - Pipeline", ["pipelines", "stages"])
            .with_group(
                "CRM - Sellers",
                [
                    "sellers",
                    "seller_goal_groups",
                    "seller_monthly_goals",
                    "seller_goal_overrides",
                ],
            )
            .with_group(
                "Sales",
                [
                    "purchases",
                    "purchase_logs",
                    "proposals",
                    "appointments",
                    "appointment_types",
                ],
            )
            .with_group(
                "Customers",
                [
                    "customers",
                    "customer_ratings",
                    "customer_timeline",
                    "customer_logs",
                ],
            )
            .with_group(
                "Catalog",
                ["products", "product_bundles", "segments", "subsegments", "businesses"],
            )
            .with_group("Geo", ["cities", "regions", "agencies"])
            .with_group(
                "Billing",
                ["invoices", "invoice_logs", "payment_attempts", "checkout_sessions"],
            )
            .with_group("Messaging", ["chat_messages", "message_templates"])
            .with_group(
                "System",
                ["activity_logs", "security_logs", "rate_limits", "national_holidays"],
            );

        for (table, column, foreign_table, foreign_column) in KNOWN_JOINS {
            registry = registry.with_join(
                *table,
                ForeignKeyRef::new(*column, *foreign_table, *foreign_column),
            );
        }

        for (table, column, lookup_table, label_field) in FK_LOOKUPS {
            registry =
                registry.with_lookup(*table, *column, LookupSpec::new(*lookup_table, *label_field));
        }

        // Legacy rows predate the CRM rollout and stay hidden everywhere.
        registry.with_mandatory_filter("leads", "crm_enabled", "true")
    }
}

/// (table, column, foreign table, foreign column)
const KNOWN_JOINS: &[(&str, &str, &str, &str)] = &[
    ("leads", "stage", "stages", "id"),
    ("leads", "pipeline", "pipelines", "id"),
    ("leads", "assigned_seller", "sellers", "id"),
    ("leads", "segment", "segments", "id"),
    ("leads", "subsegment", "subsegments", "id"),
    ("leads", "business", "businesses", "id"),
    ("leads", "agency", "agencies", "id"),
    ("purchases", "customer_id", "customers", "id"),
    ("purchases", "assigned_seller", "sellers", "id"),
    ("purchases", "lead_id", "leads", "lead_id"),
    ("purchases", "segment", "segments", "id"),
    ("purchases", "proposal_id", "proposals", "id"),
    ("purchases", "rating_id", "customer_ratings", "id"),
    ("customers", "lead_id", "leads", "lead_id"),
    ("customers", "assigned_seller", "sellers", "id"),
    ("customers", "segment", "segments", "id"),
    ("customers", "rating_id", "customer_ratings", "id"),
    ("appointments", "lead_id", "leads", "lead_id"),
    ("appointments", "seller", "sellers", "id"),
    ("appointments", "appointment_type", "appointment_types", "id"),
    ("lead_logs", "lead", "leads", "lead_id"),
    ("lead_logs", "seller_id", "sellers", "id"),
    ("lead_logs", "previous_stage", "stages", "id"),
    ("lead_logs", "next_stage", "stages", "id"),
    ("lead_phones", "lead_id", "leads", "lead_id"),
    ("lead_notes", "lead", "leads", "lead_id"),
    ("chat_messages", "lead_id", "leads", "lead_id"),
    ("checkout_sessions", "purchase_id", "purchases", "id"),
    ("checkout_sessions", "customer_id", "customers", "id"),
    ("invoices", "purchase_id", "purchases", "id"),
    ("invoices", "customer_id", "customers", "id"),
    ("customer_timeline", "customer_id", "customers", "id"),
    ("stages", "pipeline", "pipelines", "id"),
];

/// (table, column, lookup table, label field)
const FK_LOOKUPS: &[(&str, &str, &str, &str)] = &[
    ("leads", "assigned_seller", "sellers", "name"),
    ("leads", "stage", "stages", "name"),
    ("leads", "pipeline", "pipelines", "name"),
    ("leads", "segment", "segments", "name"),
    ("leads", "subsegment", "subsegments", "name"),
    ("leads", "business", "businesses", "name"),
    ("leads", "agency", "agencies", "name"),
    ("purchases", "assigned_seller", "sellers", "name"),
    ("purchases", "customer_id", "customers", "name"),
    ("purchases", "segment", "segments", "name"),
    ("purchases", "rating_id", "customer_ratings", "name"),
    ("customers", "assigned_seller", "sellers", "name"),
    ("customers", "segment", "segments", "name"),
    ("customers", "rating_id", "customer_ratings", "name"),
    ("appointments", "seller", "sellers", "name"),
    ("appointments", "appointment_type", "appointment_types", "name"),
    ("lead_logs", "seller_id", "sellers", "name"),
    ("lead_logs", "previous_stage", "stages", "name"),
    ("lead_logs", "next_stage", "stages", "name"),
    ("stages", "pipeline", "pipelines", "name"),
];
