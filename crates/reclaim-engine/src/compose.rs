// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder message composition.
//!
//! The composer builds the template variable map for one cart and hands it
//! to a [`TemplateRenderer`]. Commerce lookups are best-effort: a product the
//! catalog cannot resolve is shown as `Product #<id>`, and an unreadable
//! snapshot produces an empty item list instead of blocking the send.

use std::collections::BTreeMap;
use std::sync::Arc;

use reclaim_config::RecoveryConfig;
use reclaim_core::{
    AbandonedCart, CartSnapshot, CommerceCatalog, LineItem, OutboundEmail, ReclaimError,
    TemplateRenderer, TemplateVars,
};
use tracing::{debug, warn};

const FALLBACK_CUSTOMER_NAME: &str = "Customer";

/// Body used for the `default` template id.
pub const DEFAULT_TEMPLATE: &str = "Hi {{customer_name}},

You left a few things in your cart at {{shop_name}}:

{{cart_items}}

Cart total: {{cart_total}}

Pick up where you left off: {{recovery_url}}

This link expires in {{expiry_days}} days.
";

pub struct MessageComposer {
    catalog: Arc<dyn CommerceCatalog>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl MessageComposer {
    pub fn new(catalog: Arc<dyn CommerceCatalog>, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { catalog, renderer }
    }

    /// Render the reminder for `cart` carrying `token`.
    pub async fn compose(
        &self,
        cart: &AbandonedCart,
        config: &RecoveryConfig,
        token: &str,
    ) -> Result<OutboundEmail, ReclaimError> {
        let vars = self.variables(cart, config, token).await;
        let body = self.renderer.render(&config.template_id, &vars)?;
        let subject = self.renderer.render_str(&config.subject, &vars);
        Ok(OutboundEmail {
            recipient: cart.email.trim().to_string(),
            subject,
            body,
        })
    }

    /// The variable map exposed to templates.
    pub async fn variables(
        &self,
        cart: &AbandonedCart,
        config: &RecoveryConfig,
        token: &str,
    ) -> TemplateVars {
        let snapshot = CartSnapshot::decode(&cart.cart_contents);
        if snapshot.is_empty() && !cart.cart_contents.trim().is_empty() {
            debug!(cart_id = %cart.id, "cart snapshot unreadable; sending without items");
        }

        let mut lines = Vec::with_capacity(snapshot.line_items().len());
        for item in snapshot.line_items() {
            lines.push(self.describe(item).await);
        }

        let mut vars = BTreeMap::new();
        vars.insert("customer_name".to_string(), self.customer_name(cart).await);
        vars.insert("cart_items".to_string(), lines.join("\n"));
        vars.insert("cart_total".to_string(), format!("{:.2}", cart.cart_total));
        vars.insert(
            "recovery_url".to_string(),
            recovery_url(&config.recovery_base_url, token),
        );
        vars.insert(
            "expiry_days".to_string(),
            config.recovery_link_expiry_days.to_string(),
        );
        vars.insert("shop_name".to_string(), config.shop_name.clone());
        vars
    }

    async fn customer_name(&self, cart: &AbandonedCart) -> String {
        match self.catalog.customer_name(&cart.email).await {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => FALLBACK_CUSTOMER_NAME.to_string(),
            Err(e) => {
                warn!(cart_id = %cart.id, error = %e, "customer lookup failed");
                FALLBACK_CUSTOMER_NAME.to_string()
            }
        }
    }

    async fn describe(&self, item: &LineItem) -> String {
        match self.catalog.product(item.product_id).await {
            Ok(Some(product)) => format!(
                "- {} x{} ({:.2})",
                product.name, item.quantity, product.unit_price
            ),
            Ok(None) => format!("- Product #{} x{}", item.product_id, item.quantity),
            Err(e) => {
                warn!(product_id = %item.product_id, error = %e, "product lookup failed");
                format!("- Product #{} x{}", item.product_id, item.quantity)
            }
        }
    }
}

/// Append `token` to the landing URL as a query parameter.
pub fn recovery_url(base: &str, token: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}token={token}")
}

/// `{{name}}` substitution over an in-memory template set.
///
/// Unknown placeholders are left untouched so typos stay visible in the
/// delivered message.
#[derive(Debug, Clone)]
pub struct PlaceholderRenderer {
    templates: BTreeMap<String, String>,
}

impl Default for PlaceholderRenderer {
    fn default() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert("default".to_string(), DEFAULT_TEMPLATE.to_string());
        Self { templates }
    }
}

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a template.
    pub fn with_template(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.templates.insert(id.into(), content.into());
        self
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template_id: &str, vars: &TemplateVars) -> Result<String, ReclaimError> {
        let content = self
            .templates
            .get(template_id)
            .ok_or_else(|| ReclaimError::Template(format!("unknown template `{template_id}`")))?;
        Ok(self.render_str(content, vars))
    }

    fn render_str(&self, content: &str, vars: &TemplateVars) -> String {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                out.push_str(&rest[open..]);
                return out;
            };
            let key = after[..close].trim();
            match vars.get(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[open..open + 2 + close + 2]),
            }
            rest = &after[close + 2..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_test_utils::{MockCatalog, fixtures};

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn placeholders_are_substituted() {
        let r = PlaceholderRenderer::new();
        let v = vars(&[("name", "Ada"), ("shop", "Gears")]);
        assert_eq!(r.render_str("Hi {{name}} from {{ shop }}!", &v), "Hi Ada from Gears!");
        assert_eq!(r.render_str("{{missing}} stays", &v), "{{missing}} stays");
        assert_eq!(r.render_str("dangling {{name", &v), "dangling {{name");
        assert_eq!(r.render_str("no placeholders", &v), "no placeholders");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let r = PlaceholderRenderer::new();
        assert!(matches!(
            r.render("winter", &TemplateVars::new()),
            Err(ReclaimError::Template(_))
        ));
        let r = r.with_template("winter", "Brr {{name}}");
        assert_eq!(r.render("winter", &vars(&[("name", "Bo")])).unwrap(), "Brr Bo");
    }

    #[test]
    fn recovery_url_appends_token() {
        assert_eq!(
            recovery_url("https://shop.example/recover", "abc"),
            "https://shop.example/recover?token=abc"
        );
        assert_eq!(
            recovery_url("https://shop.example/r?src=mail", "abc"),
            "https://shop.example/r?src=mail&token=abc"
        );
    }

    #[tokio::test]
    async fn composes_with_catalog_lookups() {
        let catalog = MockCatalog::new()
            .with_product(42, "Blue Mug", 12.5)
            .with_customer("ada@example.com", "Ada");
        let composer = MessageComposer::new(Arc::new(catalog), Arc::new(PlaceholderRenderer::new()));
        let config = RecoveryConfig {
            shop_name: "Gears".into(),
            subject: "{{customer_name}}, your cart misses you".into(),
            ..RecoveryConfig::default()
        };
        let cart = fixtures::cart_with_products("ada@example.com", fixtures::t0(), &[42, 7]);

        let email = composer.compose(&cart, &config, "tok").await.unwrap();
        assert_eq!(email.recipient, "ada@example.com");
        assert_eq!(email.subject, "Ada, your cart misses you");
        assert!(email.body.contains("- Blue Mug x1 (12.50)"));
        assert!(email.body.contains("- Product #7 x1"));
        assert!(email.body.contains("?token=tok"));
        assert!(email.body.contains("expires in 7 days"));
        assert!(email.body.contains("Gears"));
    }

    #[tokio::test]
    async fn catalog_failures_fall_back() {
        let catalog = MockCatalog::new().failing();
        let composer = MessageComposer::new(Arc::new(catalog), Arc::new(PlaceholderRenderer::new()));
        let cart = fixtures::cart_with_products("x@example.com", fixtures::t0(), &[9]);
        let v = composer
            .variables(&cart, &RecoveryConfig::default(), "t")
            .await;
        assert_eq!(v["customer_name"], "Customer");
        assert_eq!(v["cart_items"], "- Product #9 x1");
    }

    #[tokio::test]
    async fn unreadable_snapshot_still_composes() {
        let composer = MessageComposer::new(
            Arc::new(MockCatalog::new()),
            Arc::new(PlaceholderRenderer::new()),
        );
        let mut cart = fixtures::cart("x@example.com", fixtures::t0());
        cart.cart_contents = "%%garbage%%".into();
        let email = composer
            .compose(&cart, &RecoveryConfig::default(), "t")
            .await
            .unwrap();
        assert!(email.body.contains("Cart total:"));
        let v = composer.variables(&cart, &RecoveryConfig::default(), "t").await;
        assert_eq!(v["cart_items"], "");
    }
}
