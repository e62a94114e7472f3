//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly. Regenerate with
//! `diesel print-schema` when the migrations change.

diesel::table! {
    /// Customer and admin accounts.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Unique, lowercased email address.
        email -> Varchar,
        /// Hex-encoded credential digest.
        password_digest -> Varchar,
        /// `customer` or `admin`.
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// The product catalogue.
    products (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (max 200 characters).
        name -> Varchar,
        /// Marketing description.
        description -> Text,
        /// Unit price in minor units (cents).
        price_cents -> Int8,
        /// File-store reference for the product image.
        image -> Varchar,
        /// Display-form category name.
        category -> Varchar,
        /// Units available for sale; decremented by order placement.
        stock -> Int4,
        /// Featured-strip flag.
        featured -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Placed orders with their line-item snapshots.
    orders (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Account that placed the order.
        account_id -> Uuid,
        /// Line-item snapshots as a JSON array.
        items -> Jsonb,
        /// Recipient full name.
        full_name -> Varchar,
        /// Contact email for carrier updates.
        email -> Varchar,
        /// Street address.
        address -> Varchar,
        /// City.
        city -> Varchar,
        /// Postal code.
        postal_code -> Varchar,
        /// Country.
        country -> Varchar,
        /// Exact order total in minor units, fixed at creation.
        total_cents -> Int8,
        /// Fulfilment status wire form.
        status -> Varchar,
        /// Hidden from default admin listings when true.
        archived -> Bool,
        /// Placement timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Message threads: contact enquiries, item requests, order chats.
    messages (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Thread kind wire form.
        kind -> Varchar,
        /// Sender display name.
        name -> Varchar,
        /// Sender email, lowercased.
        email -> Varchar,
        /// Contact subject or constructed order subject.
        subject -> Nullable<Varchar>,
        /// Contact body or generated order summary.
        body -> Nullable<Text>,
        /// Requested item name (request threads).
        item_name -> Nullable<Varchar>,
        /// Free-form category hint (request threads).
        category -> Nullable<Varchar>,
        /// Longer request description.
        description -> Nullable<Text>,
        /// Budget hint (request threads).
        budget -> Nullable<Varchar>,
        /// Reference URL (request threads).
        reference_url -> Nullable<Varchar>,
        /// Attachment references as a JSON array of strings.
        attachments -> Jsonb,
        /// Append-only reply history as a JSON array.
        replies -> Jsonb,
        /// Request lifecycle status wire form.
        status -> Varchar,
        /// Admin read flag.
        read -> Bool,
        /// Hidden from default admin listings when true.
        archived -> Bool,
        /// Correlated order; partial unique index enforces one thread per
        /// order.
        order_id -> Nullable<Uuid>,
        /// Submission timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(orders -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, messages, orders, products);
