//! `portal seed`: the brokerage's showcase content.
//!
//! Rows are matched by their natural key (name, title, label or question)
//! and overwritten, so running the command again refreshes the copy without
//! duplicating anything. Uploaded images and custom slugs already attached to
//! matched rows are kept.

use crate::services::ServiceError;
use crate::store::catalogue::{insert_machine, update_machine};
use crate::store::settings;
use crate::store::{find_id_by, Resource, Store, StoreError};
use chrono::Utc;
use common::model::catalogue::{Availability, Category, Industry};
use common::model::content::{Faq, Partner, ServiceOffering, Testimonial};
use common::model::settings::{HeroMetric, ValueProposition};
use common::requests::admin::MachinePayload;
use log::info;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use rust_decimal::Decimal;

const METRICS: [(&str, &str, &str); 3] = [
    ("Global deployments delivered", "480+", "fa-solid fa-earth-americas"),
    ("Average commissioning lead time", "11.4 weeks", "fa-solid fa-stopwatch"),
    ("OEM alliances under SLA", "126", "fa-solid fa-handshake-angle"),
];

const VALUE_PROPS: [(&str, &str, &str); 4] = [
    (
        "Predictive procurement intelligence",
        "Every RFQ flows through our machine-learning engine that benchmarks technical fit, \
         landed cost, and uptime probabilities before you ever speak to suppliers.",
        "fa-solid fa-brain",
    ),
    (
        "Inspection-first assurance",
        "Resident QA teams oversee FAT, NDT, and regulatory documentation so your assets clear \
         compliance and start-up faster.",
        "fa-solid fa-shield-check",
    ),
    (
        "Lifecycle performance control",
        "Commissioning engineers, spare-parts buffers, and condition monitoring dashboards keep \
         the fleet running with 99% availability.",
        "fa-solid fa-arrows-rotate",
    ),
    (
        "Flexible commercial pathways",
        "Own, lease, or outcome-based contracting. Financing desks tailor capital strategy to \
         your balance sheet.",
        "fa-solid fa-scale-balanced",
    ),
];

const SERVICES: [(&str, &str, &str); 4] = [
    (
        "Specification engineering",
        "Translate production goals into technical specs, power loads, and compliance matrices.",
        "fa-solid fa-compass-drafting",
    ),
    (
        "Supplier vetting & audits",
        "AI-ranked shortlist plus boots-on-ground audits to de-risk supplier selection.",
        "fa-solid fa-microscope",
    ),
    (
        "Project logistics & commissioning",
        "Door-to-line execution with erection crews, training, and performance ramp plans.",
        "fa-solid fa-truck-ramp-box",
    ),
    (
        "Lifecycle analytics",
        "IoT retrofits and CMMS tie-ins ensure uptime, energy, and OEE dashboards stay visible.",
        "fa-solid fa-chart-line",
    ),
];

/// Name, description, icon, feature statement.
const INDUSTRIES: [(&str, &str, &str, &str); 6] = [
    (
        "Automotive & EV",
        "High-throughput assembly, lightweighting, and battery module integration lines ready for ramp.",
        "fa-solid fa-car-on",
        "Launched 5 giga-scale welding programs in 18 months.",
    ),
    (
        "Food & Beverage",
        "CIP-ready processing, aseptic filling, and cold-chain automation tailored to HACCP standards.",
        "fa-solid fa-bottle-water",
        "Zero-recall track record across three continents.",
    ),
    (
        "Renewable Energy",
        "Solar glass laminators, blade fabrication, and grid-scale battery pack assembly cells.",
        "fa-solid fa-solar-panel",
        "Supplying the top five utility-scale EPCs.",
    ),
    (
        "Pharmaceutical",
        "GMP-compliant reactors, blister lines, and clean-room handling with global validation.",
        "fa-solid fa-pills",
        "Validated by WHO prequalification auditors.",
    ),
    (
        "Construction Materials",
        "Bulk powder plants, precast automation, and mobile batching units with rapid deployment.",
        "fa-solid fa-city",
        "Delivered 2.4M tons annual capacity in 2023.",
    ),
    (
        "Logistics & Warehousing",
        "Automated storage, AMR fleets, and vision-enabled sortation for omni-channel retailers.",
        "fa-solid fa-boxes-stacked",
        "Boosted fulfillment efficiency by 33% avg.",
    ),
];

const CATEGORIES: [(&str, &str, &str); 4] = [
    (
        "Automation Lines",
        "Robotic and vision-enabled production lines ready for turnkey deployment.",
        "fa-solid fa-robot",
    ),
    (
        "Processing Systems",
        "Thermal, mixing, and chemical processing skid systems with full validation.",
        "fa-solid fa-industry",
    ),
    (
        "Material Handling",
        "Smart conveyors, ASRS, and palletization systems for discrete and process industries.",
        "fa-solid fa-dolly",
    ),
    (
        "Energy & Utilities",
        "Power conditioning, compressed air, and waste-to-energy systems for plant resilience.",
        "fa-solid fa-bolt",
    ),
];

struct SeedMachine {
    name: &'static str,
    category: &'static str,
    industries: &'static [&'static str],
    short_description: &'static str,
    description: &'static str,
    features: &'static [&'static str],
    model_number: &'static str,
    manufacturer: &'static str,
    power_rating_kw: i64,
    capacity_output: &'static str,
    price_from: i64,
    lead_time_weeks: u32,
    warranty_months: u32,
    availability: Availability,
    highlight_text: &'static str,
    financing_available: bool,
}

const MACHINES: [SeedMachine; 3] = [
    SeedMachine {
        name: "HyperForge Robotic Welding Cell",
        category: "Automation Lines",
        industries: &["Automotive & EV", "Construction Materials"],
        short_description: "Modular MIG/TIG welding cell with adaptive vision for high-mix chassis fabrication.",
        description: "Deliver flawless weld integrity with AI-guided torch paths, dual-station fixtures, \
            and integrated fume extraction designed for 24/7 operations.",
        features: &[
            "Adaptive torch compensation using thermal camera feedback",
            "Cycle analytics via integrated MES connector",
            "Tool-less fixture swaps under 3 minutes",
        ],
        model_number: "HF-4200X",
        manufacturer: "Titan Nexus Robotics Consortium",
        power_rating_kw: 65,
        capacity_output: "28 chassis/hour",
        price_from: 320_000,
        lead_time_weeks: 10,
        warranty_months: 24,
        availability: Availability::InStock,
        highlight_text: "EV-ready welding intelligence",
        financing_available: true,
    },
    SeedMachine {
        name: "AquaPure CIP Skid 4.0",
        category: "Processing Systems",
        industries: &["Food & Beverage", "Pharmaceutical"],
        short_description: "Smart clean-in-place skid with recipe automation and sustainability analytics.",
        description: "Reduce changeover time with auto-validated CIP cycles, remote diagnostics, and \
            water reclamation technology tuned for regulated environments.",
        features: &[
            "PID control with digital twin simulations",
            "Validated reporting aligned with FDA 21 CFR Part 11",
            "30% water reclamation via closed-loop filtration",
        ],
        model_number: "CIP-4K",
        manufacturer: "Nexus Fluid Systems",
        power_rating_kw: 32,
        capacity_output: "Up to 4 concurrent circuits",
        price_from: 185_000,
        lead_time_weeks: 12,
        warranty_months: 18,
        availability: Availability::BackOrder,
        highlight_text: "Sustainability optimized",
        financing_available: false,
    },
    SeedMachine {
        name: "HeliosSmart Solar Glass Laminator",
        category: "Energy & Utilities",
        industries: &["Renewable Energy"],
        short_description: "High-throughput laminator delivering premium solar glass modules with inline QC.",
        description: "Designed for utility-scale players seeking precision lamination with minimal \
            scrap and automated defect rejection using spectral cameras.",
        features: &[
            "4-lane lamination with automatic EVA alignment",
            "Spectral inspection rejecting defects under 0.2mm",
            "Edge sealing robot with adaptive thermal profile",
        ],
        model_number: "HX-GL720",
        manufacturer: "Helios Manufacturing Alliance",
        power_rating_kw: 120,
        capacity_output: "720 modules/shift",
        price_from: 540_000,
        lead_time_weeks: 16,
        warranty_months: 36,
        availability: Availability::CustomBuild,
        highlight_text: "Utility-scale throughput",
        financing_available: true,
    },
];

/// Client, role, company, industry, quote, rating, highlight.
const TESTIMONIALS: [(&str, &str, &str, &str, &str, u8, bool); 3] = [
    (
        "Amelia Hart",
        "VP Operations",
        "NovaVolt Mobility",
        "Automotive & EV",
        "Titan Nexus compressed our welding line deployment from 22 to 12 weeks and handed over \
         with OEE north of 92% on day one.",
        5,
        true,
    ),
    (
        "Dr. Rizwan Malik",
        "Head of Manufacturing Science",
        "PureLife Nutraceuticals",
        "Food & Beverage",
        "Their CIP skid arrived audit-ready with digital validation packs. We cleared EU \
         inspections without a single deviation.",
        5,
        true,
    ),
    (
        "Sofia El-Amin",
        "Chief Projects Officer",
        "Aurora Renewables",
        "Renewable Energy",
        "HeliosSmart laminators from Titan Nexus pushed our module output up 38% while cutting \
         scrap in half.",
        4,
        false,
    ),
];

const PARTNERS: [(&str, &str); 4] = [
    ("Siemens Motion Alliance", "https://siemens.com"),
    ("Atlas Robotics Consortium", "https://atlas-robotics.example"),
    ("Helios Manufacturing Alliance", "https://helios-industries.example"),
    ("PureFlow Process Equipment", "https://pureflow.example"),
];

const FAQS: [(&str, &str); 4] = [
    (
        "How fast can you mobilise a sourcing project?",
        "Our launch desk produces a comparative sourcing dossier within 5 working days, including \
         technical evaluation, landed cost, and risk scoring.",
    ),
    (
        "Do you support factory acceptance tests and audits?",
        "Yes, QA engineers run FAT protocols, third-party inspections, and virtual factory \
         walk-throughs so stakeholders can sign-off with confidence.",
    ),
    (
        "Can Titan Nexus arrange financing or leasing?",
        "We partner with regional lenders and export credit agencies to structure capex-light \
         options including operating leases and performance-based contracts.",
    ),
    (
        "What after-sales support is included?",
        "Each deployment includes spare strategy, remote monitoring enablement, and optional \
         resident engineers for the first 90 days of production.",
    ),
];

/// Counts of rows written by [`run`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub industries: usize,
    pub categories: usize,
    pub machines: usize,
    pub testimonials: usize,
}

/// Applies the showcase content in one transaction.
pub fn run(store: &Store) -> Result<SeedSummary, ServiceError> {
    let summary = store.write(|tx| {
        seed_settings(tx)?;
        seed_settings_children(tx)?;
        seed_services(tx)?;
        let summary = SeedSummary {
            industries: seed_industries(tx)?,
            categories: seed_categories(tx)?,
            machines: seed_machines(tx)?,
            testimonials: seed_testimonials(tx)?,
        };
        seed_partners(tx)?;
        seed_faqs(tx)?;
        Ok::<_, ServiceError>(summary)
    })?;
    info!("Seed data successfully applied.");
    Ok(summary)
}

/// Validates `row` and writes it over `existing`, or inserts it.
fn upsert<R: Resource>(conn: &Connection, existing: Option<i64>, mut row: R) -> Result<i64, ServiceError> {
    row.prepare()?;
    match existing {
        Some(id) => {
            row.update(conn, id)?;
            Ok(id)
        }
        None => Ok(row.insert(conn)?),
    }
}

/// Deletes rows of `table` whose `column` is not one of `keep`.
fn prune(conn: &Connection, table: &str, column: &str, keep: &[&str]) -> Result<(), StoreError> {
    let placeholders = (1..=keep.len())
        .map(|n| format!("?{}", n))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("DELETE FROM {} WHERE {} NOT IN ({})", table, column, placeholders);
    conn.execute(&sql, params_from_iter(keep.iter()))?;
    Ok(())
}

fn seed_settings(conn: &Connection) -> Result<(), ServiceError> {
    let mut copy = settings::load_or_create(conn)?;
    copy.tagline = "Powering production with precision partnerships".to_string();
    copy.hero_title = "Heavy machinery, delivered with intelligence".to_string();
    copy.hero_subtitle = "We orchestrate sourcing, inspection, and commissioning for capital \
        equipment across automotive, food, energy, and process industries."
        .to_string();
    copy.primary_cta_label = "Explore Catalogue".to_string();
    copy.primary_cta_link = "/catalogue/".to_string();
    copy.secondary_cta_label = "Request Custom Build".to_string();
    copy.secondary_cta_link = "/custom-request/".to_string();
    copy.about_title = "AI-accelerated general order suppliers".to_string();
    copy.about_body = "Titan Nexus Industrial Supply unites procurement strategists, automation \
        engineers, and logistics specialists to shorten the path between requirement and \
        production impact. Our AI-driven vendor intelligence graph evaluates cost, compliance, \
        and uptime history across 420+ OEM relationships, enabling clients to deploy machinery \
        that performs at scale."
        .to_string();
    copy.experience_highlight = "Dedicated launch pods in Karachi, Dubai, and Rotterdam manage \
        factory acceptance testing, duty drawback, and last-mile commissioning."
        .to_string();
    copy.experience_years = 18;
    copy.machines_deployed = 486;
    copy.uptime_commitment = "99.2% fleet uptime guarantee".to_string();
    copy.response_time = "Quote turnaround in under 24 hours".to_string();
    copy.contact_email = "engage@titannexus.co".to_string();
    copy.contact_phone = "+92 300 1234567".to_string();
    copy.whatsapp_link = "https://wa.me/971501234567".to_string();
    copy.operation_regions = "Pakistan, GCC, Europe, North America".to_string();
    copy.support_hours = "Global support 24/7".to_string();
    copy.newsletter_blurb = "Insights on capital projects, predictive maintenance, and financing \
        strategies delivered monthly."
        .to_string();
    copy.footer_statement = "Certified general order supplier for critical industries with \
        dual-shore execution teams."
        .to_string();
    copy.validate()?;
    settings::save(conn, &copy)?;
    Ok(())
}

fn seed_settings_children(conn: &Connection) -> Result<(), ServiceError> {
    let labels: Vec<&str> = METRICS.iter().map(|(label, _, _)| *label).collect();
    prune(conn, "hero_metrics", "label", &labels)?;
    for (order, (label, value, icon)) in METRICS.iter().enumerate() {
        let existing = find_id_by(conn, "hero_metrics", "label", label)?;
        let metric = HeroMetric {
            id: 0,
            label: label.to_string(),
            value: value.to_string(),
            icon: icon.to_string(),
            display_order: order as u32 + 1,
        };
        upsert(conn, existing, metric)?;
    }

    let titles: Vec<&str> = VALUE_PROPS.iter().map(|(title, _, _)| *title).collect();
    prune(conn, "value_propositions", "title", &titles)?;
    for (order, (title, description, icon)) in VALUE_PROPS.iter().enumerate() {
        let existing = find_id_by(conn, "value_propositions", "title", title)?;
        let prop = ValueProposition {
            id: 0,
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            display_order: order as u32 + 1,
        };
        upsert(conn, existing, prop)?;
    }
    Ok(())
}

fn seed_services(conn: &Connection) -> Result<(), ServiceError> {
    let titles: Vec<&str> = SERVICES.iter().map(|(title, _, _)| *title).collect();
    prune(conn, "service_offerings", "title", &titles)?;
    for (order, (title, description, icon)) in SERVICES.iter().enumerate() {
        let existing = find_id_by(conn, "service_offerings", "title", title)?;
        let service = ServiceOffering {
            id: 0,
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            display_order: order as u32 + 1,
        };
        upsert(conn, existing, service)?;
    }
    Ok(())
}

fn seed_industries(conn: &Connection) -> Result<usize, ServiceError> {
    for (order, (name, description, icon, feature)) in INDUSTRIES.iter().enumerate() {
        let existing = find_id_by(conn, "industries", "name", name)?;
        let slug = match existing {
            Some(id) => Industry::get(conn, id)?.slug,
            None => String::new(),
        };
        let industry = Industry {
            id: 0,
            name: name.to_string(),
            slug,
            description: description.to_string(),
            icon: icon.to_string(),
            feature_statement: feature.to_string(),
            display_order: order as u32 + 1,
        };
        upsert(conn, existing, industry)?;
    }
    Ok(INDUSTRIES.len())
}

fn seed_categories(conn: &Connection) -> Result<usize, ServiceError> {
    for (order, (name, description, icon)) in CATEGORIES.iter().enumerate() {
        let existing = find_id_by(conn, "categories", "name", name)?;
        let slug = match existing {
            Some(id) => Category::get(conn, id)?.slug,
            None => String::new(),
        };
        let category = Category {
            id: 0,
            name: name.to_string(),
            slug,
            description: description.to_string(),
            icon: icon.to_string(),
            display_order: order as u32 + 1,
        };
        upsert(conn, existing, category)?;
    }
    Ok(CATEGORIES.len())
}

fn seed_machines(conn: &Connection) -> Result<usize, ServiceError> {
    for seed in &MACHINES {
        let category_id =
            find_id_by(conn, "categories", "name", seed.category)?.ok_or(StoreError::NotFound)?;
        let mut industry_ids = Vec::new();
        for name in seed.industries {
            if let Some(id) = find_id_by(conn, "industries", "name", name)? {
                industry_ids.push(id);
            }
        }
        let payload = MachinePayload {
            name: seed.name.to_string(),
            slug: None,
            category_id,
            industry_ids,
            short_description: seed.short_description.to_string(),
            description: seed.description.to_string(),
            key_features: seed.features.join("\n"),
            model_number: seed.model_number.to_string(),
            manufacturer: seed.manufacturer.to_string(),
            power_rating_kw: Some(Decimal::from(seed.power_rating_kw)),
            capacity_output: seed.capacity_output.to_string(),
            price_from: Some(Decimal::from(seed.price_from)),
            currency: "USD".to_string(),
            lead_time_weeks: seed.lead_time_weeks,
            warranty_months: seed.warranty_months,
            availability: seed.availability,
            highlight_text: seed.highlight_text.to_string(),
            video_url: String::new(),
            is_featured: true,
            financing_available: seed.financing_available,
        };
        payload.validate()?;
        match find_id_by(conn, "machines", "name", seed.name)? {
            Some(id) => update_machine(conn, id, &payload)?,
            None => insert_machine(conn, &payload)?,
        };
    }
    Ok(MACHINES.len())
}

fn seed_testimonials(conn: &Connection) -> Result<usize, ServiceError> {
    for (client, role, company, industry, quote, rating, highlight) in TESTIMONIALS {
        let existing: Option<(i64, Option<String>)> = conn
            .query_row(
                "SELECT id, avatar FROM testimonials WHERE client_name = ?1 AND company = ?2
                 ORDER BY id LIMIT 1",
                params![client, company],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(StoreError::from)?;
        let testimonial = Testimonial {
            id: 0,
            client_name: client.to_string(),
            client_role: role.to_string(),
            company: company.to_string(),
            industry_id: find_id_by(conn, "industries", "name", industry)?,
            quote: quote.to_string(),
            rating,
            highlight,
            avatar: existing.as_ref().and_then(|(_, avatar)| avatar.clone()),
            created_at: Utc::now(),
        };
        upsert(conn, existing.map(|(id, _)| id), testimonial)?;
    }
    Ok(TESTIMONIALS.len())
}

fn seed_partners(conn: &Connection) -> Result<(), ServiceError> {
    for (order, (name, website)) in PARTNERS.iter().enumerate() {
        let existing = find_id_by(conn, "partners", "name", name)?;
        let logo = match existing {
            Some(id) => Partner::get(conn, id)?.logo,
            None => None,
        };
        let partner = Partner {
            id: 0,
            name: name.to_string(),
            website: website.to_string(),
            logo,
            caption: String::new(),
            display_order: order as u32 + 1,
        };
        upsert(conn, existing, partner)?;
    }
    Ok(())
}

fn seed_faqs(conn: &Connection) -> Result<(), ServiceError> {
    for (order, (question, answer)) in FAQS.iter().enumerate() {
        let existing = find_id_by(conn, "faqs", "question", question)?;
        let faq = Faq {
            id: 0,
            question: question.to_string(),
            answer: answer.to_string(),
            category: String::new(),
            display_order: order as u32 + 1,
        };
        upsert(conn, existing, faq)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::catalogue::{featured_machines, get_machine_by_slug, list_machines};

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let store = Store::open_in_memory().unwrap();
        let first = run(&store).unwrap();
        let second = run(&store).unwrap();
        assert_eq!(first, second);

        store
            .read(|conn| {
                assert_eq!(list_machines(conn)?.len(), 3);
                assert_eq!(Industry::list(conn)?.len(), 6);
                assert_eq!(Category::list(conn)?.len(), 4);
                assert_eq!(HeroMetric::list(conn)?.len(), 3);
                assert_eq!(Testimonial::list(conn)?.len(), 3);
                assert_eq!(Faq::list(conn)?.len(), 4);
                Ok::<_, StoreError>(())
            })
            .unwrap();
    }

    #[test]
    fn seeded_machines_are_linked_and_featured() {
        let store = Store::open_in_memory().unwrap();
        run(&store).unwrap();
        store
            .read(|conn| {
                let welder = get_machine_by_slug(conn, "hyperforge-robotic-welding-cell")?;
                assert_eq!(welder.industry_ids.len(), 2);
                assert_eq!(welder.price_display(), "USD 320,000");
                assert_eq!(welder.feature_list().len(), 3);
                let featured = featured_machines(conn, 6)?;
                let names: Vec<&str> = featured.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(
                    names,
                    [
                        "AquaPure CIP Skid 4.0",
                        "HeliosSmart Solar Glass Laminator",
                        "HyperForge Robotic Welding Cell"
                    ]
                );
                Ok::<_, StoreError>(())
            })
            .unwrap();
    }

    #[test]
    fn stale_metrics_are_pruned() {
        let store = Store::open_in_memory().unwrap();
        store
            .write(|tx| {
                HeroMetric {
                    id: 0,
                    label: "Old number".to_string(),
                    value: "1".to_string(),
                    icon: String::new(),
                    display_order: 9,
                }
                .insert(tx)
            })
            .unwrap();
        run(&store).unwrap();
        let labels: Vec<String> = store
            .read(HeroMetric::list)
            .unwrap()
            .into_iter()
            .map(|m| m.label)
            .collect();
        assert_eq!(labels.len(), 3);
        assert!(!labels.contains(&"Old number".to_string()));
    }
}
