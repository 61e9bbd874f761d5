//! Narrative generation over an aging summary.
//!
//! Pure templating, no model call: the "insight" text is a fixed Portuguese
//! narrative interpolating four counts from an already-normalized
//! [`AgingSummary`]. Stateless and referentially transparent; the same
//! summary always produces byte-identical output. The thinking delay the
//! front-end shows before revealing the text is a UI concern and does not
//! live here.

use crate::receivables::AgingSummary;

/// Render the aging narrative. Never fails; performs no I/O.
///
/// Fixed order of statements: overall total, priority attention
/// (overdue 30-60), cash-flow preparation (due within 30), opportunity
/// (due today). Markdown-like bold markers and blank-line separators are part
/// of the contract; the front-end converts them to rich text.
pub fn synthesize_insight(summary: &AgingSummary) -> String {
    format!(
        "**Análise dos Títulos Financeiros:**\n\n\
         📊 **Situação Geral:** Você possui {total} títulos no total.\n\n\
         ⚠️ **Atenção Prioritária:** {overdue_30_60} títulos com atraso entre 30-60 dias requerem ação imediata.\n\n\
         📈 **Gestão de Fluxo:** {due_within_30} títulos vencem nos próximos 30 dias - prepare o fluxo de caixa.\n\n\
         ✅ **Oportunidade:** {due_today} títulos vencem hoje - contate os clientes para agilizar o pagamento.",
        total = summary.total,
        overdue_30_60 = summary.overdue_30_to_60,
        due_within_30 = summary.due_within_30,
        due_today = summary.due_today,
    )
}
