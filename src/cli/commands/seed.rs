use anyhow::Result;
use chrono::Utc;
use model::entities::{crop, disease, disease_treatment, treatment, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info, trace};

use crate::auth::hash_password;
use crate::config::{connect_and_migrate, Settings};

const DEMO_PASSWORD: &str = "password123";

struct SeedUser {
    username: &'static str,
    phone_number: &'static str,
    county: &'static str,
    is_extension_agent: bool,
}

const USERS: &[SeedUser] = &[
    SeedUser { username: "john_farmer", phone_number: "+254712345678", county: "Kiambu", is_extension_agent: false },
    SeedUser { username: "mary_farmer", phone_number: "+254723456789", county: "Nakuru", is_extension_agent: false },
    SeedUser { username: "agent_smith", phone_number: "+254734567890", county: "Nairobi", is_extension_agent: true },
    SeedUser { username: "sarah_wanjiku", phone_number: "+254745678901", county: "Muranga", is_extension_agent: false },
    SeedUser { username: "agent_johnson", phone_number: "+254756789012", county: "Kisumu", is_extension_agent: true },
    SeedUser { username: "peter_kamau", phone_number: "+254767890123", county: "Meru", is_extension_agent: false },
];

/// (name, scientific name, base region)
const CROPS: &[(&str, &str, &str)] = &[
    ("Maize", "Zea mays", "Rift Valley, Western Kenya"),
    ("Beans", "Phaseolus vulgaris", "Central Kenya, Eastern Kenya"),
    ("Potatoes", "Solanum tuberosum", "Central Kenya, Rift Valley"),
    ("Tomatoes", "Solanum lycopersicum", "Central Kenya, Coast Region"),
    ("Cabbage", "Brassica oleracea", "Central Kenya, Nairobi"),
    ("Kale", "Brassica oleracea var. acephala", "Central Kenya, Rift Valley"),
    ("Rice", "Oryza sativa", "Nyanza, Coast Region"),
    ("Wheat", "Triticum aestivum", "Rift Valley, North Eastern"),
];

/// (name, symptoms, cause, model accuracy)
///
/// The second half mirrors the labels produced by the image classifier so
/// scans can be linked to a disease row.
const DISEASES: &[(&str, &str, &str, f64)] = &[
    ("Maize Streak Virus", "Yellow streaks on leaves", "Maize streak virus transmitted by leafhoppers", 0.92),
    ("Late Blight", "Dark lesions on leaves", "Phytophthora infestans fungus", 0.88),
    ("Bean Rust", "Orange-brown pustules on leaves", "Uromyces appendiculatus fungus", 0.85),
    ("Bacterial Wilt", "Wilting of plants", "Ralstonia solanacearum bacteria", 0.90),
    ("Diamondback Moth", "Holes in leaves", "Plutella xylostella insect pest", 0.87),
    ("Anthracnose", "Dark sunken lesions on pods", "Colletotrichum lindemuthianum fungus", 0.83),
    ("Rice Blast", "Diamond-shaped lesions", "Magnaporthe oryzae fungus", 0.89),
    ("Wheat Stem Rust", "Reddish-brown pustules", "Puccinia graminis fungus", 0.91),
    ("Leaf Rust", "Orange to brown pustules on leaf surfaces", "Puccinia fungi", 0.86),
    ("Powdery Mildew", "White powdery coating on leaves", "Erysiphales fungi", 0.84),
    ("Leaf Blight", "Large tan or brown dead patches on leaves", "Fungal pathogens favoured by wet weather", 0.82),
    ("Leaf Spot", "Small dark spots with yellow halos", "Fungal or bacterial leaf pathogens", 0.80),
    ("Mosaic Virus", "Mottled light and dark green leaves", "Viruses spread by aphids and tools", 0.78),
    ("Root Rot", "Wilting with soft brown roots", "Waterlogged soil and soil-borne fungi", 0.75),
];

/// (name, description, organic, cost estimate)
const TREATMENTS: &[(&str, &str, bool, &str)] = &[
    ("Copper-based Fungicide", "Chemical fungicide", false, "KES 800-1200 per litre"),
    ("Neem Oil Spray", "Organic pesticide", true, "KES 600-900 per litre"),
    ("Bacillus subtilis", "Biological control agent", true, "KES 1500-2000 per kg"),
    ("Mancozeb Fungicide", "Broad-spectrum chemical fungicide", false, "KES 1000-1500 per kg"),
    ("Compost Tea", "Organic fertilizer", true, "KES 200-400 per litre"),
    ("Pyrethrin-based Insecticide", "Natural insecticide", true, "KES 1200-1800 per litre"),
    ("Trichoderma harzianum", "Beneficial fungus", true, "KES 800-1200 per kg"),
    ("Systemic Insecticide", "Chemical insecticide", false, "KES 2000-3000 per litre"),
    ("Plant Growth Promoters", "Organic compounds", true, "KES 500-800 per litre"),
    ("Sulfur-based Fungicide", "Chemical fungicide", false, "KES 400-600 per kg"),
];

/// Disease name to treatment names, best first.
const LINKS: &[(&str, &[&str])] = &[
    ("Maize Streak Virus", &["Neem Oil Spray", "Plant Growth Promoters"]),
    ("Late Blight", &["Copper-based Fungicide", "Mancozeb Fungicide", "Bacillus subtilis"]),
    ("Bean Rust", &["Sulfur-based Fungicide", "Copper-based Fungicide", "Trichoderma harzianum"]),
    ("Bacterial Wilt", &["Bacillus subtilis", "Trichoderma harzianum", "Compost Tea"]),
    ("Diamondback Moth", &["Neem Oil Spray", "Pyrethrin-based Insecticide", "Systemic Insecticide"]),
    ("Anthracnose", &["Copper-based Fungicide", "Mancozeb Fungicide", "Bacillus subtilis"]),
    ("Rice Blast", &["Trichoderma harzianum", "Copper-based Fungicide", "Sulfur-based Fungicide"]),
    ("Wheat Stem Rust", &["Mancozeb Fungicide", "Copper-based Fungicide", "Plant Growth Promoters"]),
    ("Leaf Rust", &["Sulfur-based Fungicide", "Mancozeb Fungicide", "Trichoderma harzianum"]),
    ("Powdery Mildew", &["Sulfur-based Fungicide", "Neem Oil Spray", "Bacillus subtilis"]),
    ("Leaf Blight", &["Copper-based Fungicide", "Mancozeb Fungicide"]),
    ("Leaf Spot", &["Copper-based Fungicide", "Mancozeb Fungicide", "Compost Tea"]),
    ("Mosaic Virus", &["Neem Oil Spray", "Plant Growth Promoters"]),
    ("Root Rot", &["Trichoderma harzianum", "Bacillus subtilis", "Compost Tea"]),
];

/// Rows inserted by one seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub crops: usize,
    pub diseases: usize,
    pub treatments: usize,
    pub links: usize,
}

pub async fn seed(settings: &Settings) -> Result<()> {
    trace!("Entering seed function");
    let db = connect_and_migrate(&settings.database_url).await?;
    let summary = seed_database(&db, settings.auth.bcrypt_cost).await?;
    info!(
        "Seeding completed: {} users, {} crops, {} diseases, {} treatments, {} links",
        summary.users, summary.crops, summary.diseases, summary.treatments, summary.links
    );
    Ok(())
}

/// Inserts the demo data that is not present yet, in one transaction.
pub async fn seed_database(db: &DatabaseConnection, bcrypt_cost: u32) -> Result<SeedSummary> {
    let password_hash = hash_password(DEMO_PASSWORD.to_string(), bcrypt_cost).await?;
    let txn = db.begin().await?;

    let summary = SeedSummary {
        users: seed_users(&txn, &password_hash).await?,
        crops: seed_crops(&txn).await?,
        diseases: seed_diseases(&txn).await?,
        treatments: seed_treatments(&txn).await?,
        links: seed_links(&txn).await?,
    };

    txn.commit().await?;
    Ok(summary)
}

async fn seed_users<C: ConnectionTrait>(db: &C, password_hash: &str) -> Result<usize> {
    let mut inserted = 0;
    for data in USERS {
        let exists = user::Entity::find()
            .filter(user::Column::Username.eq(data.username))
            .one(db)
            .await?
            .is_some();
        if exists {
            debug!("User {} already present", data.username);
            continue;
        }

        user::ActiveModel {
            username: Set(data.username.to_string()),
            email: Set(format!("{}@agrismart.local", data.username)),
            password_hash: Set(password_hash.to_string()),
            phone_number: Set(Some(data.phone_number.to_string())),
            county: Set(Some(data.county.to_string())),
            is_extension_agent: Set(data.is_extension_agent),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn seed_crops<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let mut inserted = 0;
    for (name, scientific_name, base_region) in CROPS {
        if crop::Entity::find().filter(crop::Column::Name.eq(*name)).one(db).await?.is_some() {
            continue;
        }
        crop::ActiveModel {
            name: Set(name.to_string()),
            scientific_name: Set(Some(scientific_name.to_string())),
            base_region: Set(Some(base_region.to_string())),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn seed_diseases<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let mut inserted = 0;
    for (name, symptoms, cause, accuracy) in DISEASES {
        if disease::Entity::find().filter(disease::Column::Name.eq(*name)).one(db).await?.is_some() {
            continue;
        }
        disease::ActiveModel {
            name: Set(name.to_string()),
            symptoms: Set(Some(symptoms.to_string())),
            cause: Set(Some(cause.to_string())),
            ai_model_accuracy: Set(Some(*accuracy)),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn seed_treatments<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let mut inserted = 0;
    for (name, description, organic, cost) in TREATMENTS {
        if treatment::Entity::find().filter(treatment::Column::Name.eq(*name)).one(db).await?.is_some() {
            continue;
        }
        treatment::ActiveModel {
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            organic_status: Set(*organic),
            cost_estimate: Set(Some(cost.to_string())),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn seed_links<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let mut inserted = 0;
    for (disease_name, treatment_names) in LINKS {
        let Some(disease_row) = disease::Entity::find()
            .filter(disease::Column::Name.eq(*disease_name))
            .one(db)
            .await?
        else {
            continue;
        };

        for (rank, treatment_name) in treatment_names.iter().enumerate() {
            let Some(treatment_row) = treatment::Entity::find()
                .filter(treatment::Column::Name.eq(*treatment_name))
                .one(db)
                .await?
            else {
                continue;
            };

            let linked = disease_treatment::Entity::find_by_id((disease_row.id, treatment_row.id))
                .one(db)
                .await?
                .is_some();
            if linked {
                continue;
            }

            disease_treatment::ActiveModel {
                disease_id: Set(disease_row.id),
                treatment_id: Set(treatment_row.id),
                priority_rank: Set(rank as i32 + 1),
            }
            .insert(db)
            .await?;
            inserted += 1;
        }
    }
    Ok(inserted)
}
