//! Plain-text quotation rendering.

use std::fmt::Write;

use crate::quotation::Quotation;

/// Render a quotation as a plain-text document.
#[must_use]
pub fn render_text(q: &Quotation) -> String {
    let mut out = String::new();
    // Writing to a String never fails.
    let _ = write_document(&mut out, q);
    out
}

fn write_document(out: &mut String, q: &Quotation) -> std::fmt::Result {
    writeln!(out, "QUOTATION")?;
    writeln!(out, "Project:          {}", q.project_id)?;
    writeln!(out, "Estimate version: {}", q.estimate_version)?;
    writeln!(out, "Version:          {}", q.version)?;
    writeln!(out, "Status:           {}", q.status)?;
    writeln!(out, "Date:             {}", q.updated_at.format("%Y-%m-%d"))?;
    if let Some(remarks) = &q.remarks {
        writeln!(out, "Remarks:          {remarks}")?;
    }

    if !q.items.labor_items.is_empty() {
        writeln!(out, "\nLABOR")?;
        for item in &q.items.labor_items {
            writeln!(
                out,
                "  {:<32} {:>8} h x {:>12} = {:>14}",
                item.task, item.hours, item.rate, item.total
            )?;
        }
    }
    if !q.items.material_items.is_empty() {
        writeln!(out, "\nMATERIALS")?;
        for item in &q.items.material_items {
            writeln!(
                out,
                "  {:<32} {:>8} x {:>14} = {:>14}",
                item.description, item.quantity, item.unit_price, item.total
            )?;
        }
    }
    if !q.items.service_items.is_empty() {
        writeln!(out, "\nSERVICES")?;
        for item in &q.items.service_items {
            writeln!(out, "  {:<58} {:>14}", item.service, item.cost)?;
        }
    }
    if !q.items.contingency_items.is_empty() {
        writeln!(out, "\nCONTINGENCY")?;
        for item in &q.items.contingency_items {
            writeln!(out, "  {:<58} {:>14}", item.description, item.amount)?;
        }
    }
    if !q.items.tax_items.is_empty() {
        writeln!(out, "\nTAX")?;
        for item in &q.items.tax_items {
            let label = match item.percentage {
                Some(pct) => format!("{} ({pct}%)", item.description),
                None => item.description.clone(),
            };
            writeln!(out, "  {label:<58} {:>14}", item.amount)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "  {:<58} {:>14}", "SUBTOTAL", q.totals.subtotal)?;
    writeln!(out, "  {:<58} {:>14}", "CONTINGENCY", q.totals.total_contingency)?;
    writeln!(out, "  {:<58} {:>14}", "TAX", q.totals.total_tax)?;
    writeln!(out, "  {:<58} {:>14}", "GRAND TOTAL", q.totals.grand_total)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_quotation;

    #[test]
    fn test_render_lists_items_and_totals() {
        let text = render_text(&sample_quotation());

        assert!(text.starts_with("QUOTATION"));
        assert!(text.contains("Design"));
        assert!(text.contains("Cable"));
        assert!(text.contains("GRAND TOTAL"));
        assert!(text.contains("600"));
        assert!(!text.contains("SERVICES"));
    }
}
