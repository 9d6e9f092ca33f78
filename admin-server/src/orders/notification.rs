//! Customer notification templates
//!
//! One email per status change, keyed on the new status. Bodies are rendered
//! from `templates/email/order_status.{html,txt}`.

use askama::Template;

use crate::db::models::{Order, OrderStatus};
use crate::services::OutgoingEmail;
use crate::services::email::EmailError;

/// HTML body of the status email
#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusEmailHtml<'a> {
    bakery: &'a str,
    message: &'a str,
}

/// Plain text alternative
#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusEmailText<'a> {
    bakery: &'a str,
    message: &'a str,
}

/// Subject line for a status
pub fn subject_for(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::PickedUp => "Order Completed",
        OrderStatus::Baking => "Order Baking In Progress",
        OrderStatus::ReadyForPickup => "Order Ready for Pickup",
        OrderStatus::Pending | OrderStatus::Canceled => "Order Update",
    }
}

/// Customer-facing sentence for a status
pub fn message_for(status: OrderStatus, customer: &str, short_id: &str) -> String {
    match status {
        OrderStatus::PickedUp => format!(
            "Dear {customer}, your order #{short_id} has been picked up. \
             We hope you have a sweet celebration! We're already excited for your next order."
        ),
        OrderStatus::Baking => format!(
            "Dear {customer}, our ovens are working their magic on your order #{short_id}! \
             Your cake will be ready soon."
        ),
        OrderStatus::ReadyForPickup => format!(
            "Dear {customer}, time for cake! Your order #{short_id} is ready for pickup. \
             We can't wait for you to see it!"
        ),
        OrderStatus::Pending | OrderStatus::Canceled => {
            format!("Dear {customer}, your order with ID {short_id} has been updated.")
        }
    }
}

/// Compose the status email for an order (already carrying its new status)
pub fn compose(order: &Order, bakery_name: &str) -> Result<OutgoingEmail, EmailError> {
    let message = message_for(order.status, &order.user_name, &order.short_id());
    let html = OrderStatusEmailHtml {
        bakery: bakery_name,
        message: &message,
    }
    .render()?;
    let text = OrderStatusEmailText {
        bakery: bakery_name,
        message: &message,
    }
    .render()?;

    Ok(OutgoingEmail {
        to: order.user_email.clone(),
        subject: subject_for(order.status).to_string(),
        text,
        html: Some(html),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::RecordId;

    fn order(status: OrderStatus, name: &str) -> Order {
        Order {
            id: Some(RecordId::from_table_key("orders", "x7k2c9d1")),
            user_id: Some("cust-1".into()),
            user_name: name.into(),
            user_email: "ana@example.com".into(),
            cart_items: vec![],
            total_amount: 30.0,
            pickup_date_time: "2024-12-24T10:00".into(),
            payment_method: "card".into(),
            status,
            created_at: 0,
        }
    }

    #[test]
    fn test_subjects() {
        assert_eq!(subject_for(OrderStatus::PickedUp), "Order Completed");
        assert_eq!(subject_for(OrderStatus::Baking), "Order Baking In Progress");
        assert_eq!(subject_for(OrderStatus::ReadyForPickup), "Order Ready for Pickup");
        assert_eq!(subject_for(OrderStatus::Pending), "Order Update");
        assert_eq!(subject_for(OrderStatus::Canceled), "Order Update");
    }

    #[test]
    fn test_compose_uses_short_id_and_bakery_name() {
        let email = compose(&order(OrderStatus::ReadyForPickup, "Ana"), "Crumbs & Co").unwrap();
        assert_eq!(email.to, "ana@example.com");
        assert!(email.text.contains("#c9d1"));
        assert!(email.text.contains("Dear Ana"));
        assert!(email.text.contains("Thank you for choosing Crumbs & Co!"));
        let html = email.html.unwrap();
        assert!(html.contains("Crumbs &amp; Co"));
        assert!(html.contains("ready for pickup"));
    }

    #[test]
    fn test_customer_name_escaped_in_html() {
        let email = compose(&order(OrderStatus::Baking, "<b>Eve</b>"), "Bakery Easy").unwrap();
        let html = email.html.unwrap();
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(!html.contains("<b>Eve"));
    }
}
