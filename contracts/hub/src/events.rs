//! Notifications, published as `("CL", kind, name)` topics.

use soroban_sdk::{symbol_short, Env, IntoVal, Symbol, Val};

pub fn ok<D: IntoVal<Env, Val>>(e: &Env, name: &str, data: D) {
    publish(e, symbol_short!("OK"), name, data);
}

pub fn err<D: IntoVal<Env, Val>>(e: &Env, name: &str, data: D) {
    publish(e, symbol_short!("ERR"), name, data);
}

pub fn dbg<D: IntoVal<Env, Val>>(e: &Env, name: &str, data: D) {
    publish(e, symbol_short!("DBG"), name, data);
}

fn publish<D: IntoVal<Env, Val>>(e: &Env, kind: Symbol, name: &str, data: D) {
    e.events()
        .publish((symbol_short!("CL"), kind, Symbol::new(e, name)), data);
}
