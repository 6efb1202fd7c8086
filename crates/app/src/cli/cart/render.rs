use cartsync::carts::CartSnapshot;
use cartsync_app::money::format_minor;
use rusty_money::iso::Currency;

pub(crate) fn print_cart(snapshot: &CartSnapshot, currency: &'static Currency) {
    let lines = snapshot.lines();

    if lines.is_empty() {
        println!("cart is empty");
    }

    for line in lines {
        println!(
            "{item}  {name} x{quantity} @ {unit} = {total}",
            item = line.uuid,
            name = line.product.name,
            quantity = line.quantity,
            unit = format_minor(line.unit_price, currency),
            total = format_minor(line.line_total(), currency),
        );
    }

    if let Some(coupon) = &snapshot.coupon {
        println!("coupon:   {}", coupon.code);
    }

    println!("subtotal: {}", format_minor(snapshot.totals.subtotal, currency));
    println!("discount: {}", format_minor(snapshot.totals.discount, currency));
    println!("total:    {}", format_minor(snapshot.totals.total, currency));

    for issue in &snapshot.stock_issues {
        println!(
            "warning: {} has {} in cart but only {} in stock",
            issue.product_name, issue.requested, issue.available_quantity
        );
    }
}
