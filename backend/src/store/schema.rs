//! Tables for the portal database, created idempotently at start-up.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS site_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    business_name TEXT NOT NULL,
    tagline TEXT NOT NULL DEFAULT '',
    hero_title TEXT NOT NULL,
    hero_subtitle TEXT NOT NULL DEFAULT '',
    primary_cta_label TEXT NOT NULL,
    primary_cta_link TEXT NOT NULL,
    secondary_cta_label TEXT NOT NULL DEFAULT '',
    secondary_cta_link TEXT NOT NULL DEFAULT '',
    hero_background TEXT,
    about_title TEXT NOT NULL,
    about_body TEXT NOT NULL DEFAULT '',
    experience_highlight TEXT NOT NULL DEFAULT '',
    experience_years INTEGER NOT NULL DEFAULT 18,
    machines_deployed INTEGER NOT NULL DEFAULT 450,
    uptime_commitment TEXT NOT NULL,
    response_time TEXT NOT NULL,
    contact_email TEXT NOT NULL DEFAULT '',
    contact_phone TEXT NOT NULL DEFAULT '',
    whatsapp_link TEXT NOT NULL DEFAULT '',
    operation_regions TEXT NOT NULL DEFAULT '',
    support_hours TEXT NOT NULL DEFAULT '',
    newsletter_blurb TEXT NOT NULL DEFAULT '',
    promo_video_url TEXT NOT NULL DEFAULT '',
    footer_statement TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hero_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    settings_id INTEGER NOT NULL DEFAULT 1 REFERENCES site_settings(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    value TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS value_propositions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    settings_id INTEGER NOT NULL DEFAULT 1 REFERENCES site_settings(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS industries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    icon TEXT NOT NULL DEFAULT '',
    feature_statement TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    icon TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS machines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    short_description TEXT NOT NULL,
    description TEXT NOT NULL,
    key_features TEXT NOT NULL DEFAULT '',
    model_number TEXT NOT NULL DEFAULT '',
    manufacturer TEXT NOT NULL DEFAULT '',
    power_rating_kw TEXT,
    capacity_output TEXT NOT NULL DEFAULT '',
    price_from TEXT,
    currency TEXT NOT NULL DEFAULT 'USD',
    lead_time_weeks INTEGER NOT NULL DEFAULT 8,
    warranty_months INTEGER NOT NULL DEFAULT 12,
    availability_status TEXT NOT NULL DEFAULT 'in_stock'
        CHECK (availability_status IN ('in_stock', 'back_order', 'custom_build')),
    highlight_text TEXT NOT NULL DEFAULT '',
    hero_image TEXT,
    brochure TEXT,
    video_url TEXT NOT NULL DEFAULT '',
    is_featured INTEGER NOT NULL DEFAULT 0,
    financing_available INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS machine_industries (
    machine_id INTEGER NOT NULL REFERENCES machines(id) ON DELETE CASCADE,
    industry_id INTEGER NOT NULL REFERENCES industries(id) ON DELETE CASCADE,
    PRIMARY KEY (machine_id, industry_id)
);

CREATE TABLE IF NOT EXISTS machine_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    machine_id INTEGER NOT NULL REFERENCES machines(id) ON DELETE CASCADE,
    image TEXT NOT NULL,
    caption TEXT NOT NULL DEFAULT '',
    is_primary INTEGER NOT NULL DEFAULT 0,
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS machine_documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    machine_id INTEGER NOT NULL REFERENCES machines(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    document TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS partners (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    website TEXT NOT NULL DEFAULT '',
    logo TEXT,
    caption TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS testimonials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_name TEXT NOT NULL,
    client_role TEXT NOT NULL DEFAULT '',
    company TEXT NOT NULL,
    industry_id INTEGER REFERENCES industries(id) ON DELETE SET NULL,
    quote TEXT NOT NULL,
    rating INTEGER NOT NULL DEFAULT 5,
    highlight INTEGER NOT NULL DEFAULT 0,
    avatar TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS faqs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS service_offerings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '',
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS custom_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reference_code TEXT NOT NULL UNIQUE,
    contact_name TEXT NOT NULL,
    company_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    industry_id INTEGER REFERENCES industries(id) ON DELETE SET NULL,
    machine_type TEXT NOT NULL,
    capacity_requirement TEXT NOT NULL DEFAULT '',
    budget_min TEXT,
    budget_max TEXT,
    currency TEXT NOT NULL DEFAULT 'USD',
    project_location TEXT NOT NULL DEFAULT '',
    deployment_timeline TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL,
    attachment TEXT,
    preferred_contact_method TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'new'
        CHECK (status IN ('new', 'review', 'quoted', 'fulfilled')),
    internal_notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS request_status_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id INTEGER NOT NULL REFERENCES custom_requests(id) ON DELETE CASCADE,
    status TEXT NOT NULL CHECK (status IN ('new', 'review', 'quoted', 'fulfilled')),
    comment TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_machines_category ON machines(category_id);
CREATE INDEX IF NOT EXISTS idx_status_logs_request ON request_status_logs(request_id);
"#;
