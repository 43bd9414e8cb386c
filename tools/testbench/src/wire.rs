//! Command and response encoding on the signal boundary
//!
//! Operands an opcode does not use are driven as zero. Response payload
//! fields are opaque on the wire: which of them are meaningful depends on the
//! opcode of the command being answered, so acknowledgements decode against
//! that opcode.

use types::command::{Command, CommandKind, Opcode};
use types::errors::WireError;
use types::ids::Uid;
use types::price::Price;
use types::response::{Payload, Response, Status, TradeEvent};

use crate::signals::{PortsIn, PortsOut};

/// Drive `cmd` onto the command bus
///
/// Stop orders put the trigger on `cmd_price1` and the stop-limit limit price
/// on `cmd_price`; devices wired to carry the trigger on `cmd_price` need the
/// two swapped.
pub fn drive_command(ports: &mut PortsIn, cmd: &Command) {
    ports.cmd_vld = true;
    ports.cmd_opcode = cmd.opcode().code();
    ports.cmd_uid = cmd.uid.value();
    ports.cmd_quantity = 0;
    ports.cmd_price = 0;
    ports.cmd_price1 = 0;
    ports.cmd_uid1 = 0;

    match cmd.kind {
        CommandKind::Nop
        | CommandKind::QueryBidAsk
        | CommandKind::PopTopBid
        | CommandKind::PopTopAsk => {}
        CommandKind::BuyLimit { quantity, price } | CommandKind::SellLimit { quantity, price } => {
            ports.cmd_quantity = quantity;
            ports.cmd_price = price.pack();
        }
        CommandKind::BuyMarket { quantity } | CommandKind::SellMarket { quantity } => {
            ports.cmd_quantity = quantity;
        }
        CommandKind::Cancel { target } => ports.cmd_uid1 = target.value(),
        CommandKind::QueryAsksAtOrBelow { price } | CommandKind::QueryBidsAtOrAbove { price } => {
            ports.cmd_price = price.pack();
        }
        CommandKind::BuyStopLoss { quantity, trigger }
        | CommandKind::SellStopLoss { quantity, trigger } => {
            ports.cmd_quantity = quantity;
            ports.cmd_price1 = trigger.pack();
        }
        CommandKind::BuyStopLimit { quantity, price, trigger }
        | CommandKind::SellStopLimit { quantity, price, trigger } => {
            ports.cmd_quantity = quantity;
            ports.cmd_price = price.pack();
            ports.cmd_price1 = trigger.pack();
        }
    }
}

/// Deassert command-valid
pub fn idle(ports: &mut PortsIn) {
    ports.cmd_vld = false;
}

/// Read the command currently on the bus (ignores `cmd_vld`)
pub fn decode_command(ports: &PortsIn) -> Result<Command, WireError> {
    let quantity = ports.cmd_quantity;
    let price = Price::unpack(ports.cmd_price);
    let trigger = Price::unpack(ports.cmd_price1);

    let kind = match Opcode::from_code(ports.cmd_opcode)? {
        Opcode::Nop => CommandKind::Nop,
        Opcode::QueryBidAsk => CommandKind::QueryBidAsk,
        Opcode::BuyLimit => CommandKind::BuyLimit { quantity, price },
        Opcode::SellLimit => CommandKind::SellLimit { quantity, price },
        Opcode::BuyMarket => CommandKind::BuyMarket { quantity },
        Opcode::SellMarket => CommandKind::SellMarket { quantity },
        Opcode::PopTopBid => CommandKind::PopTopBid,
        Opcode::PopTopAsk => CommandKind::PopTopAsk,
        Opcode::Cancel => CommandKind::Cancel {
            target: Uid::new(ports.cmd_uid1),
        },
        Opcode::QueryAsksAtOrBelow => CommandKind::QueryAsksAtOrBelow { price },
        Opcode::QueryBidsAtOrAbove => CommandKind::QueryBidsAtOrAbove { price },
        Opcode::BuyStopLoss => CommandKind::BuyStopLoss { quantity, trigger },
        Opcode::SellStopLoss => CommandKind::SellStopLoss { quantity, trigger },
        Opcode::BuyStopLimit => CommandKind::BuyStopLimit { quantity, price, trigger },
        Opcode::SellStopLimit => CommandKind::SellStopLimit { quantity, price, trigger },
    };
    Ok(Command::new(ports.cmd_uid, kind))
}

/// Present `rsp` on the response bus, clearing fields it does not use
pub fn present_response(ports: &mut PortsOut, rsp: &Response) {
    clear_response(ports);
    ports.rsp_vld = true;
    ports.rsp_uid = rsp.wire_uid().value();

    match *rsp {
        Response::Trade(trade) => {
            ports.rsp_status = Status::Okay.code();
            ports.rsp_trade_bid_uid = trade.bid_uid.value();
            ports.rsp_trade_ask_uid = trade.ask_uid.value();
            ports.rsp_trade_quantity = trade.quantity;
        }
        Response::Ack { status, payload, .. } => {
            ports.rsp_status = status.code();
            match payload {
                Payload::None => {}
                Payload::PopTop { price, quantity, uid } => {
                    ports.rsp_pop_price = price.pack();
                    ports.rsp_pop_quantity = quantity;
                    ports.rsp_pop_uid = uid.value();
                }
                Payload::BookTop { bid, ask } => {
                    ports.rsp_bid = bid.pack();
                    ports.rsp_ask = ask.pack();
                }
                Payload::Accumulator { quantity } => ports.rsp_accum = quantity,
            }
        }
    }
}

/// Deassert response-valid and zero every response field
pub fn clear_response(ports: &mut PortsOut) {
    *ports = PortsOut {
        cmd_full: ports.cmd_full,
        cn_mature_vld: ports.cn_mature_vld,
        cn_mature_uid: ports.cn_mature_uid,
        ..PortsOut::default()
    };
}

/// Decode a response whose uid is the trade sentinel
pub fn decode_trade(ports: &PortsOut) -> Response {
    Response::Trade(TradeEvent {
        bid_uid: Uid::new(ports.rsp_trade_bid_uid),
        ask_uid: Uid::new(ports.rsp_trade_ask_uid),
        quantity: ports.rsp_trade_quantity,
    })
}

/// Decode an acknowledgement answering a command with opcode `context`
pub fn decode_ack(ports: &PortsOut, context: Opcode) -> Result<Response, WireError> {
    let uid = Uid::new(ports.rsp_uid);
    let status = Status::from_code(ports.rsp_status)?;
    if status != Status::Okay {
        return Ok(Response::status(uid, status));
    }

    let payload = match context {
        Opcode::PopTopBid | Opcode::PopTopAsk => Payload::PopTop {
            price: Price::unpack(ports.rsp_pop_price),
            quantity: ports.rsp_pop_quantity,
            uid: Uid::new(ports.rsp_pop_uid),
        },
        Opcode::QueryBidAsk => Payload::BookTop {
            bid: Price::unpack(ports.rsp_bid),
            ask: Price::unpack(ports.rsp_ask),
        },
        Opcode::QueryAsksAtOrBelow | Opcode::QueryBidsAtOrAbove => Payload::Accumulator {
            quantity: ports.rsp_accum,
        },
        _ => Payload::None,
    };
    Ok(Response::okay(uid, payload))
}
