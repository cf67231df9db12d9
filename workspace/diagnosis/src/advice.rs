//! Static treatment and prevention advice keyed by disease label.

/// Treatment and prevention text for one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advice {
    pub treatment: &'static str,
    pub prevention: &'static str,
}

pub const HEALTHY: Advice = Advice {
    treatment: "No treatment needed. Your plant appears healthy! Continue with regular maintenance.",
    prevention: "Maintain proper watering, ensure good soil nutrition, and monitor regularly for early signs of disease.",
};

/// Used for labels without a dedicated entry.
pub const GENERIC: Advice = Advice {
    treatment: "Consult with agricultural expert for specific treatment. Isolate affected plants to prevent spread.",
    prevention: "Practice good sanitation, crop rotation, and monitor plants regularly for early detection.",
};

/// Advice for a disease label produced by the classifier.
pub fn for_disease(label: &str) -> Advice {
    match label {
        "Leaf Rust" => Advice {
            treatment: "Apply fungicide containing chlorothalonil or mancozeb. Remove and destroy severely infected leaves. Improve air circulation between plants.",
            prevention: "Plant resistant varieties. Avoid overhead watering. Ensure proper spacing between plants. Remove plant debris at season end.",
        },
        "Powdery Mildew" => Advice {
            treatment: "Apply sulfur-based fungicide or neem oil. Remove severely infected leaves. Improve air circulation and reduce humidity.",
            prevention: "Maintain proper plant spacing. Avoid nitrogen over-fertilization. Water in the morning to allow leaves to dry.",
        },
        "Leaf Blight" => Advice {
            treatment: "Apply copper-based fungicide. Remove and destroy infected plant parts. Avoid working with plants when wet.",
            prevention: "Practice crop rotation. Use disease-free seeds. Ensure proper drainage and avoid overcrowding.",
        },
        "Leaf Spot" => Advice {
            treatment: "Remove and destroy infected leaves. Apply fungicidal sprays. Avoid overhead watering to prevent spread.",
            prevention: "Water at soil level. Space plants properly. Clean garden tools between uses.",
        },
        "Mosaic Virus" => Advice {
            treatment: "Remove and destroy infected plants immediately. Control aphid populations with insecticidal soap.",
            prevention: "Use virus-free seeds. Control insect vectors. Disinfect tools between plants.",
        },
        "Bacterial Wilt" => Advice {
            treatment: "Remove and destroy infected plants. Solarize soil. There is no cure for bacterial wilt.",
            prevention: "Plant resistant varieties. Practice crop rotation. Control cucumber beetles.",
        },
        "Root Rot" => Advice {
            treatment: "Improve soil drainage. Reduce watering frequency. Apply fungicide to soil if necessary.",
            prevention: "Ensure proper drainage. Avoid overwatering. Use well-draining soil mix.",
        },
        _ => GENERIC,
    }
}
