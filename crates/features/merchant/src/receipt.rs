use crate::charges::ChargeLine;
use chub_kernel::prelude::Mail;
use std::fmt::Write;

/// Plain-text receipt for a completed charge.
pub(crate) fn compose(id: &str, to: &str, lines: &[ChargeLine], currency: &str) -> Mail {
    let mut body = String::from("Thank you for your purchase.\n\n");
    for line in lines {
        let _ = writeln!(
            body,
            "{} x {} @ {:.2} {currency} = {:.2} {currency}",
            line.quantity, line.name, line.price, line.amount
        );
    }
    let total: f64 = lines.iter().map(|line| line.amount).sum();
    let _ = write!(body, "\nTotal: {total:.2} {currency}\nCharge: {id}\n");

    Mail::new(to, format!("Receipt for charge {id}"), body)
}
