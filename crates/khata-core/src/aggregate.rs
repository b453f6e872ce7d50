//! Credit/debit aggregation

use rust_decimal::Decimal;

use crate::models::{ExpenseEntry, Person, PersonSummary, Summary};
use crate::types::EntryType;

/// `a + b`, clamped to the representable range instead of overflowing
fn clamped_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        log::warn!(target: "khata::core", "Decimal overflow adding {} and {}, clamping", a, b);
        if b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Total credit, total debit and balance over `entries`.
///
/// Totals beyond the `Decimal` range clamp to `Decimal::MAX` / `Decimal::MIN`.
pub fn summarize<'a, I>(entries: I) -> Summary
where
    I: IntoIterator<Item = &'a ExpenseEntry>,
{
    let (total_credit, total_debit) = entries.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(credit, debit), entry| match entry.entry_type {
            EntryType::Credit => (clamped_add(credit, entry.amount), debit),
            EntryType::Debit => (credit, clamped_add(debit, entry.amount)),
        },
    );

    Summary {
        total_credit,
        total_debit,
        balance: clamped_add(total_credit, -total_debit),
    }
}

/// Summary for `person`, counting only entries that reference them
pub fn person_summary(person: &Person, entries: &[ExpenseEntry]) -> PersonSummary {
    PersonSummary {
        id: person.id,
        name: person.name.clone(),
        summary: summarize(entries.iter().filter(|e| e.person_id == person.id)),
    }
}
