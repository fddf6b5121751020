//! Keyword vocabularies per category.
//!
//! Carried over from `model/core/data_generator.py` in the original
//! source (`SPEC_FULL.md` §F.1): the same keyword lists used there to
//! synthesize training documents double as the keyword-matching
//! vocabulary in `model/core/classifier_trainer.py`.

pub struct Category {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "drivers_license",
        keywords: &[
            "driver", "license", "licence", "driving licence", "driving license",
            "driver's license", "driver's licence", "identification", "id", "operator",
            "permit", "dob", "date of birth", "class", "issue date", "expiration", "expires",
            "restrictions", "endorsements", "organ donor", "dvla", "dl", "driving",
            "provisional", "wheeler", "vehicle", "motorist", "number", "license number",
            "licence number", "state", "sex", "gender", "height", "weight", "eyes",
            "eye color", "hair", "hair color", "address", "street", "city", "zip",
            "signature", "hawaii", "honolulu", "peace", "issue", "birth date", "valid",
            "status", "type",
        ],
    },
    Category {
        name: "bank_statement",
        keywords: &[
            "account", "balance", "transaction", "statement", "deposit", "withdraw",
            "bank", "checking", "savings", "beginning balance", "ending balance", "atm",
            "credit", "debit", "routing", "account no",
        ],
    },
    Category {
        name: "invoice",
        keywords: &[
            "invoice", "bill", "payment", "due date", "amount due", "total", "subtotal",
            "tax", "invoice number", "purchase order", "item", "quantity", "unit price",
            "amount", "terms", "ship to", "bill to",
        ],
    },
    Category {
        name: "tax_return",
        keywords: &[
            "tax", "return", "irs", "income", "deduction", "filing", "w-2", "1099",
            "form 1040", "exemption", "refund", "tax year", "adjusted gross income",
            "taxable income", "tax due", "withholding",
        ],
    },
    Category {
        name: "medical_record",
        keywords: &[
            "patient", "diagnosis", "prescription", "doctor", "hospital", "medical",
            "treatment", "health", "insurance", "medication", "allergies", "symptoms",
            "vital signs", "medical history", "physical examination",
        ],
    },
    Category {
        name: "insurance_claim",
        keywords: &[
            "claim", "policy", "insurance", "coverage", "premium", "beneficiary",
            "policyholder", "insurer", "claim number", "incident", "damage", "loss",
            "liability", "deductible", "coverage limits",
        ],
    },
];
