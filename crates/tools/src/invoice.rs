//! Order invoice lookup.
//!
//! There is no order backend: the invoice is generated from the order id.
//! The same id always yields the same invoice.

use async_trait::async_trait;
use genui_core::error::ToolError;
use genui_core::schema::{FieldType, ToolSchema};
use genui_core::tool::Tool;
use genui_core::ui::UiFragment;
use serde::Serialize;
use serde_json::{Value, json};

const PRODUCTS: &[&str] = &[
    "Ergonomic Steel Chair",
    "Handcrafted Cotton Shirt",
    "Rustic Wooden Table",
    "Sleek Granite Lamp",
    "Refined Bronze Keyboard",
    "Practical Rubber Shoes",
    "Gorgeous Frozen Pizza",
    "Licensed Plastic Gloves",
];
const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Linus", "Barbara", "Ken", "Margaret", "Dennis",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Torvalds", "Liskov", "Thompson", "Hamilton", "Ritchie",
];
const STREETS: &[&str] = &["Maple Avenue", "Oak Street", "Cedar Lane", "Pine Road", "Elm Court"];
const CITIES: &[(&str, &str)] = &[
    ("Austin", "Texas"),
    ("Portland", "Oregon"),
    ("Denver", "Colorado"),
    ("Madison", "Wisconsin"),
    ("Raleigh", "North Carolina"),
];
const CARD_TYPES: &[&str] = &["Visa", "Mastercard", "AMEX"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Invoice {
    order_id: String,
    line_items: Vec<LineItem>,
    shipping_address: ShippingAddress,
    customer_info: CustomerInfo,
    payment_info: PaymentInfo,
}

#[derive(Debug, Serialize)]
struct LineItem {
    id: String,
    name: String,
    quantity: u32,
    price: f64,
}

#[derive(Debug, Serialize)]
struct ShippingAddress {
    name: String,
    street: String,
    city: String,
    state: String,
    zip: String,
}

#[derive(Debug, Serialize)]
struct CustomerInfo {
    name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentInfo {
    card_type: String,
    card_number_last_four: String,
}

/// Small deterministic generator (xorshift64*) seeded from the order id.
struct Seeded(u64);

impl Seeded {
    fn from_id(id: &str) -> Self {
        // FNV-1a; the state must never be zero for xorshift.
        let hash = id.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
        Self(hash | 1)
    }

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    fn range(&mut self, min: u64, max: u64) -> u64 {
        min + self.next() % (max - min + 1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next() % items.len() as u64) as usize]
    }
}

fn generate(order_id: &str) -> Invoice {
    let mut rng = Seeded::from_id(order_id);

    let line_items = (0..3)
        .map(|_| {
            let mut bytes = [0u8; 16];
            bytes[..8].copy_from_slice(&rng.next().to_le_bytes());
            bytes[8..].copy_from_slice(&rng.next().to_le_bytes());
            LineItem {
                id: uuid::Builder::from_random_bytes(bytes).into_uuid().to_string(),
                name: rng.pick(PRODUCTS).to_string(),
                quantity: rng.range(1, 5) as u32,
                // cents between 25.00 and 250.00
                price: rng.range(2_500, 25_000) as f64 / 100.0,
            }
        })
        .collect();

    let first = *rng.pick(FIRST_NAMES);
    let last = *rng.pick(LAST_NAMES);
    let name = format!("{first} {last}");
    let (city, state) = *rng.pick(CITIES);

    Invoice {
        order_id: order_id.to_string(),
        line_items,
        shipping_address: ShippingAddress {
            name: name.clone(),
            street: format!("{} {}", rng.range(100, 9999), rng.pick(STREETS)),
            city: city.to_string(),
            state: state.to_string(),
            zip: format!("{:05}", rng.range(10_000, 99_999)),
        },
        customer_info: CustomerInfo {
            email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            phone: format!(
                "({:03}) {:03}-{:04}",
                rng.range(200, 999),
                rng.range(200, 999),
                rng.range(0, 9999)
            ),
            name,
        },
        payment_info: PaymentInfo {
            card_type: rng.pick(CARD_TYPES).to_string(),
            card_number_last_four: rng.range(1000, 9999).to_string(),
        },
    }
}

pub struct InvoiceTool;

#[async_trait]
impl Tool for InvoiceTool {
    fn name(&self) -> &str {
        "get_order_invoice"
    }

    fn description(&self) -> &str {
        "A tool to fetch the invoice from an order. This should only be called if a user uploads an image/receipt of an order."
    }

    fn input_schema(&self) -> ToolSchema {
        ToolSchema::object().required("orderId", FieldType::String, "The order ID")
    }

    async fn execute(&self, parameters: Value) -> Result<Value, ToolError> {
        let order_id = parameters["orderId"].as_str().unwrap_or_default();
        if order_id.trim().is_empty() {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: "orderId must not be empty".into(),
            });
        }
        serde_json::to_value(generate(order_id)).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }

    fn loading_fragment(&self, parameters: &Value) -> UiFragment {
        UiFragment::new("InvoiceLoading", json!({ "orderId": parameters["orderId"] }))
    }

    fn result_fragment(&self, value: &Value) -> UiFragment {
        UiFragment::new("Invoice", value.clone())
    }
}
