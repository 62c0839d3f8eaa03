//! Human-readable and JSON output.

use chain_data::{format_sats, ConfirmationStatus, FeeEstimate};
use serde_json::json;
use wallet_core::{Coin, SendReceipt, WalletIdentity, WalletSnapshot};

fn emit(value: serde_json::Value) {
    println!("{value}");
}

pub fn print_error(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        eprintln!("{}", json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("error: {err:#}");
    }
}

pub fn print_message(msg: &str, json_mode: bool) {
    if json_mode {
        emit(json!({ "status": "ok", "message": msg }));
    } else {
        println!("{msg}");
    }
}

/// `show_phrase` is set only right after creation, when the user must write it down.
pub fn print_identity(identity: &WalletIdentity, show_phrase: bool, json_mode: bool) {
    if json_mode {
        let mut value = json!({
            "addresses": identity.addresses(),
            "createdAt": identity.created_at(),
        });
        if show_phrase {
            value["mnemonic"] = json!(identity.seed_phrase());
        }
        emit(value);
        return;
    }

    if show_phrase {
        println!("Recovery phrase (write it down, it is shown once):");
        println!("  {}", identity.seed_phrase());
        println!();
    }
    for (coin, address) in identity.addresses() {
        println!("{coin:>4}  {address}");
    }
}

pub fn print_words(words: &[&str], json_mode: bool) {
    if json_mode {
        emit(json!(words));
    } else {
        println!("{}", words.join(" "));
    }
}

pub fn print_snapshot(snapshot: &WalletSnapshot, coin: Coin, json_mode: bool) {
    let balance = snapshot.balance.as_ref();
    let price = snapshot.price.as_ref();

    if json_mode {
        emit(json!({
            "phase": snapshot.phase.to_string(),
            "balance": balance.map(|b| &b.balance),
            "priceUsd": price.map(|p| p.value.usd),
            "priceChange24h": price.map(|p| p.value.usd_24h_change),
            "valueUsd": snapshot.fiat_value(),
            "transactions": snapshot.transactions,
            "lastUpdatedAt": snapshot.sync.last_updated_at,
            "lastError": snapshot.sync.last_error,
            "source": snapshot.sync.data_source_label,
        }));
        return;
    }

    println!("status:  {}", snapshot.phase);
    match balance {
        Some(b) => println!("balance: {} {} (via {})", b.balance, coin.symbol(), b.source),
        None => println!("balance: unknown"),
    }
    if let Some(p) = price {
        println!(
            "price:   ${:.2} ({:+.2}% 24h, via {})",
            p.value.usd, p.value.usd_24h_change, p.source
        );
    }
    if let Some(value) = snapshot.fiat_value() {
        println!("value:   ${value:.2}");
    }
    if let Some(at) = snapshot.sync.last_updated_at {
        println!("updated: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(err) = &snapshot.sync.last_error {
        println!("warning: {err}");
    }
    for tx in &snapshot.transactions {
        println!("  {:<7} {:>14} {}", tx.direction.to_string(), tx.amount, tx.hash);
    }
}

pub fn print_fee(fee: &FeeEstimate, coin: Coin, json_mode: bool) {
    if json_mode {
        emit(json!(fee));
    } else if fee.is_fallback() {
        println!("{} {} (fallback, no provider answered)", fee.fee_coin(), coin.symbol());
    } else {
        println!("{} {} (via {})", fee.fee_coin(), coin.symbol(), fee.source);
    }
}

pub fn print_receipt(receipt: &SendReceipt, coin: Coin, json_mode: bool) {
    if json_mode {
        emit(json!(receipt));
        return;
    }
    println!("sent {} {}", format_sats(receipt.amount_sats), coin.symbol());
    println!("fee  {} {} (via {})", format_sats(receipt.fee_sats), coin.symbol(), receipt.fee_source);
    println!("txid {} (via {})", receipt.txid, receipt.broadcast_source);
}

pub fn print_confirmation(txid: &str, status: &ConfirmationStatus, json_mode: bool) {
    if json_mode {
        emit(json!({ "txid": txid, "confirmed": status.confirmed, "source": status.source }));
    } else if status.confirmed {
        println!("{txid} confirmed (via {})", status.source);
    } else {
        println!("{txid} still unconfirmed");
    }
}
