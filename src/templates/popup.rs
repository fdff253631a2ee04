use maud::{html, Markup};

/// Info popup shown when a single property point is clicked.
/// A blank price still renders the row, just without a value.
pub fn property_popup(title: &str, price: &str) -> Markup {
    html! {
        div class="property-popup" {
            h3 { (title) }
            p { "Price: " (price) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_title_and_price() {
        let html = property_popup("Cozy Bungalow", "350000").into_string();
        assert_eq!(
            html,
            r#"<div class="property-popup"><h3>Cozy Bungalow</h3><p>Price: 350000</p></div>"#
        );
    }

    #[test]
    fn blank_price_still_renders() {
        let html = property_popup("Lot 4", "").into_string();
        assert!(html.contains("<p>Price: </p>"));
    }

    #[test]
    fn title_is_escaped() {
        let html = property_popup("<script>x</script>", "1").into_string();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
