//! A small money ledger on fixed-point numbers.
//!
//! Demonstrates:
//! - Fixed-scale decimal arithmetic without float drift
//! - Promotion rules (Int stays Int, Fixed binds Int)
//! - Deferred NumberExpr trees and where their errors surface
//! - Eager collections and grouping over domain records
//!
//! Run with: cargo run --example ledger

use anyhow::Result;
use fluentseq::{EagerCollection, Fixed, Number, NumberExpr, RoundMode};

#[derive(Clone, Debug)]
struct Entry {
    account: &'static str,
    amount: Fixed,
}

fn entry(account: &'static str, amount: &str) -> Result<Entry> {
    Ok(Entry { account, amount: amount.parse()? })
}

fn main() -> Result<()> {
    env_logger::init();

    println!("💰 Ledger Example\n");

    let entries = EagerCollection::from_values(vec![
        entry("groceries", "19.99")?,
        entry("rent", "1200.00")?,
        entry("groceries", "7.49")?,
        entry("transport", "2.75")?,
        entry("groceries", "12.30")?,
    ]);

    // =========================================================================
    // EXAMPLE 1: Exact totals per account
    // =========================================================================
    println!("📊 Example 1: Totals per account (exact, no float drift)");

    let totals = entries
        .group_by(|e| e.account)
        .map(|group| {
            group.fold(Fixed::new(0, 2), |acc, e| acc.plus(&e.amount))
        });
    totals.each(|account, total| println!("  {account}: {total}"));

    // =========================================================================
    // EXAMPLE 2: Promotion rules
    // =========================================================================
    println!("\n📊 Example 2: Promotion rules");

    let unit_price = Number::from(Fixed::new(1_999, 2)); // 19.99
    let quantity = Number::Int(3);
    let total = unit_price.times(&quantity);
    println!("  19.99 × 3        = {total} (stays Fixed)");

    let split = Number::Int(10).divide(&Number::Int(4))?;
    println!("  10 ÷ 4           = {split} (inexact Int division promotes)");

    let exact = Number::Int(10).divide(&Number::Int(5))?;
    println!("  10 ÷ 5           = {exact} (exact stays Int)");

    // =========================================================================
    // EXAMPLE 3: Comparison at the left operand's scale
    // =========================================================================
    println!("\n📊 Example 3: Fixed comparison at the left scale");

    let posted: Fixed = "100.005".parse()?;
    let pending: Fixed = "100.00499".parse()?;
    println!(
        "  100.005 vs 100.00499 → {:?} (right side truncated to 3 digits)",
        posted.compare(&pending)
    );

    // =========================================================================
    // EXAMPLE 4: Deferred expressions
    // =========================================================================
    println!("\n📊 Example 4: Deferred tax computation");

    let subtotal = entries.fold(NumberExpr::new(Fixed::new(0, 2)), |acc, e| {
        acc.plus(&NumberExpr::new(e.amount))
    });
    let tax_rate = NumberExpr::new(Fixed::new(8, 2)); // 8%
    let with_tax = subtotal
        .plus(&subtotal.times(&tax_rate))
        .rounded(2, RoundMode::HalfAway);

    println!("  grand total with tax: {}", with_tax.to_number()?);

    // A division by zero only fails when the tree is evaluated.
    let broken = with_tax.divide(&NumberExpr::new(0));
    println!("  deferred ÷0 evaluates to: {:?}", broken.to_number());

    // =========================================================================
    // EXAMPLE 5: Largest expenses
    // =========================================================================
    println!("\n📊 Example 5: Two largest expenses");

    entries
        .sort_by(|a, b| b.amount.compare(&a.amount))
        .slice(0, 2)
        .each(|e| println!("  {}: {}", e.account, e.amount));

    println!("\n✅ Done");
    Ok(())
}
