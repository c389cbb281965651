use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use bigdecimal::BigDecimal;

use super::errors::PaymentError;
use super::schemas::{Order, OrderAddress, PaymentStatus};
use crate::mollie_client::{
    MollieAmount, MollieOrderAddress, MollieOrderLineRequest, MollieOrderLineResponse,
    MollieOrderRequest, MollieOrderResponse, MollieRefundLine, MolliePaymentMethod,
};
use crate::schemas::CurrencyType;
use crate::utils::round_to_minor_units;

/// The four methods the plugin always offers; not configurable.
const PAYMENT_METHODS: [MolliePaymentMethod; 4] = [
    MolliePaymentMethod::Ideal,
    MolliePaymentMethod::CreditCard,
    MolliePaymentMethod::Paypal,
    MolliePaymentMethod::Bancontact,
];

const CHECKOUT_LOCALE: &str = "nl_NL";

/// Parses the tax rate out of the framework's stored tax-rate string by
/// taking its leading decimal prefix, so "21.0%" and "21.0000:10.50;" both
/// yield the full rate. The legacy plugin truncated to the first two
/// characters instead, which silently corrupted one-digit and fractional
/// rates.
pub fn parse_vat_rate(tax_rates: &str) -> Result<BigDecimal, PaymentError> {
    let prefix_len = tax_rates
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .count();
    let prefix = &tax_rates[..prefix_len];
    BigDecimal::from_str(prefix).map_err(|_| {
        PaymentError::ValidationError(format!(
            "Could not parse a tax rate out of {:?}",
            tax_rates
        ))
    })
}

fn format_vat_rate(rate: &BigDecimal) -> String {
    round_to_minor_units(rate).to_string()
}

/// VAT share of a tax-inclusive shipping total: `total * rate / (rate + 100)`.
pub fn shipping_vat_amount(shipping_total: &BigDecimal, vat_rate: &BigDecimal) -> BigDecimal {
    let denominator = vat_rate + BigDecimal::from(100);
    round_to_minor_units(&((shipping_total * vat_rate) / denominator))
}

/// One gateway line per order item plus a single shipping line.
pub fn build_order_lines(
    order: &Order,
    currency: CurrencyType,
) -> Result<Vec<MollieOrderLineRequest>, PaymentError> {
    let vat_rate = parse_vat_rate(&order.tax_rates)?;
    let vat_rate_str = format_vat_rate(&vat_rate);

    let mut lines = Vec::with_capacity(order.items.len() + 1);
    for item in &order.items {
        let rounded_unit_price = round_to_minor_units(&item.unit_price_incl_tax);
        let total = BigDecimal::from(item.quantity) * &rounded_unit_price;
        let unit_vat = round_to_minor_units(&(&item.unit_price_incl_tax - &item.unit_price_excl_tax));
        lines.push(MollieOrderLineRequest {
            name: item.product_name.clone(),
            quantity: item.quantity,
            sku: item.sku.clone(),
            unit_price: MollieAmount::new(currency, &rounded_unit_price),
            total_amount: MollieAmount::new(currency, &total),
            vat_rate: vat_rate_str.clone(),
            vat_amount: MollieAmount::new(currency, &unit_vat),
        });
    }

    lines.push(MollieOrderLineRequest {
        name: order.shipping_method.clone(),
        quantity: 1,
        sku: None,
        unit_price: MollieAmount::new(currency, &order.shipping_total_incl_tax),
        total_amount: MollieAmount::new(currency, &order.shipping_total_incl_tax),
        vat_rate: vat_rate_str,
        vat_amount: MollieAmount::new(
            currency,
            &shipping_vat_amount(&order.shipping_total_incl_tax, &vat_rate),
        ),
    });

    Ok(lines)
}

/// Shipping address for the gateway: the pickup point when the order is a
/// store pickup, the shipping address otherwise.
pub fn select_shipping_address(order: &Order) -> Option<&OrderAddress> {
    if order.pickup_in_store {
        order.pickup_address.as_ref()
    } else {
        order.shipping_address.as_ref()
    }
}

fn address_details(address: Option<&OrderAddress>) -> MollieOrderAddress {
    match address {
        Some(address) => MollieOrderAddress {
            given_name: address.first_name.clone(),
            family_name: address.last_name.clone(),
            email: address.email.clone(),
            street_and_number: address.street.clone(),
            city: address.city.clone(),
            region: address.region.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country_code.clone(),
        },
        None => MollieOrderAddress::default(),
    }
}

/// Assembles the full gateway order payload for one checkout attempt.
pub fn build_order_request(
    order: &Order,
    currency: CurrencyType,
    store_base_url: &str,
) -> Result<MollieOrderRequest, PaymentError> {
    let lines = build_order_lines(order, currency)?;
    Ok(MollieOrderRequest {
        amount: MollieAmount::new(currency, &order.order_total),
        order_number: order.order_number.clone(),
        lines,
        methods: PAYMENT_METHODS.to_vec(),
        billing_address: address_details(order.billing_address.as_ref()),
        shipping_address: address_details(select_shipping_address(order)),
        locale: CHECKOUT_LOCALE.to_string(),
        shopper_country_must_match_billing_country: true,
        redirect_url: format!("{}/checkout/completed/{}", store_base_url, order.id),
        webhook_url: format!("{}/payment/webhook", store_base_url),
    })
}

/// Linear scan of the gateway order list for the merchant order number.
/// The gateway never pages for the shop sizes this plugin targets.
pub fn find_gateway_order_id(
    gateway_orders: &[MollieOrderResponse],
    order_number: &str,
) -> Result<String, PaymentError> {
    gateway_orders
        .iter()
        .find(|gateway_order| gateway_order.order_number == order_number)
        .map(|gateway_order| gateway_order.id.clone())
        .ok_or_else(|| {
            PaymentError::CorrelationError(format!(
                "No gateway order found for order number {}",
                order_number
            ))
        })
}

/// One refund line per gateway line, so a full refund also covers the
/// shipping line the order was created with. Item lines are matched back to
/// the local order by sku, falling back to the product name, to carry the
/// local quantity; lines without a local counterpart are refunded whole.
pub fn build_refund_lines(
    order: &Order,
    gateway_lines: &[MollieOrderLineResponse],
) -> Vec<MollieRefundLine> {
    gateway_lines
        .iter()
        .map(|line| {
            let item = order.items.iter().find(|item| match (&item.sku, &line.sku) {
                (Some(item_sku), Some(line_sku)) => item_sku == line_sku,
                _ => line.name.as_deref() == Some(item.product_name.as_str()),
            });
            MollieRefundLine {
                id: line.id.clone(),
                quantity: item.map(|item| item.quantity).unwrap_or(1),
                amount: line.total_amount.clone(),
            }
        })
        .collect()
}

/// The gateway response is authoritative: a refund covering the full order
/// amount is a refund, anything less is partial.
pub fn derive_refund_status(
    refund_amount: &MollieAmount,
    order_amount: &MollieAmount,
) -> PaymentStatus {
    if refund_amount == order_amount {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    }
}

const WEBHOOK_DEDUP_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct DedupState {
    seen: HashSet<String>,
    insertion_order: VecDeque<String>,
}

/// Replay guard for webhook notifications, keyed on gateway order id plus
/// the reported gateway status. Only successfully applied notifications are
/// recorded, and the oldest entries are evicted once the set is full, so a
/// long-running instance keeps a bounded memory footprint.
#[derive(Debug)]
pub struct WebhookDedup {
    state: Mutex<DedupState>,
    capacity: usize,
}

impl WebhookDedup {
    pub fn new() -> Self {
        Self::with_capacity(WEBHOOK_DEDUP_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(DedupState::default()),
            capacity,
        }
    }

    fn state(&self) -> MutexGuard<'_, DedupState> {
        // a poisoned guard still holds a consistent set
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn already_processed(&self, key: &str) -> bool {
        self.state().seen.contains(key)
    }

    pub fn mark_processed(&self, key: String) {
        let mut state = self.state();
        if !state.seen.insert(key.clone()) {
            return;
        }
        state.insertion_order.push_back(key);
        while state.insertion_order.len() > self.capacity {
            if let Some(oldest) = state.insertion_order.pop_front() {
                state.seen.remove(&oldest);
            }
        }
    }
}

impl Default for WebhookDedup {
    fn default() -> Self {
        Self::new()
    }
}
