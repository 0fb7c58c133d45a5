//! Order line and order history types.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use kicks_core::{ConfirmationCode, ItemId, OrderLineId, Price, Quantity};

/// One `{itemId, quantity}` entry of a checkout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub item_id: ItemId,
    pub quantity: Quantity,
}

impl OrderLineRequest {
    #[must_use]
    pub const fn new(item_id: ItemId, quantity: Quantity) -> Self {
        Self { item_id, quantity }
    }
}

/// An order line joined with the item's display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderHistoryLine {
    pub id: OrderLineId,
    pub quantity: i64,
    pub confirmation: ConfirmationCode,
    pub name: String,
    pub price: Price,
    pub image: String,
}

/// A user's order lines grouped by confirmation code.
///
/// Groups keep the order in which their first line was written, so the JSON
/// object lists purchases oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderHistory {
    groups: Vec<(ConfirmationCode, Vec<OrderHistoryLine>)>,
    index: HashMap<ConfirmationCode, usize>,
}

impl OrderHistory {
    /// Group lines (already sorted by id) by confirmation code.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = OrderHistoryLine>) -> Self {
        let mut history = Self::default();
        for line in lines {
            let group = history
                .index
                .get(&line.confirmation)
                .and_then(|&position| history.groups.get_mut(position));
            match group {
                Some((_, group)) => group.push(line),
                None => {
                    history
                        .index
                        .insert(line.confirmation.clone(), history.groups.len());
                    history.groups.push((line.confirmation.clone(), vec![line]));
                }
            }
        }
        history
    }

    /// Lines of one purchase, if the user made it.
    #[must_use]
    pub fn get(&self, code: &ConfirmationCode) -> Option<&[OrderHistoryLine]> {
        self.index
            .get(code)
            .and_then(|&position| self.groups.get(position))
            .map(|(_, lines)| lines.as_slice())
    }

    /// Number of purchases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Confirmation codes in purchase order.
    pub fn codes(&self) -> impl Iterator<Item = &ConfirmationCode> {
        self.groups.iter().map(|(code, _)| code)
    }
}

impl Serialize for OrderHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (code, lines) in &self.groups {
            map.serialize_entry(code.as_str(), lines)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i64, code: &ConfirmationCode, name: &str) -> OrderHistoryLine {
        OrderHistoryLine {
            id: OrderLineId::new(id),
            quantity: 1,
            confirmation: code.clone(),
            name: name.to_owned(),
            price: Price::from_dollars(100),
            image: format!("images/{name}.jpg"),
        }
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let first = ConfirmationCode::from_bytes(&[0xff; ConfirmationCode::BYTES]);
        let second = ConfirmationCode::from_bytes(&[0x00; ConfirmationCode::BYTES]);
        let history = OrderHistory::from_lines([
            line(1, &first, "a"),
            line(2, &first, "b"),
            line(3, &second, "c"),
        ]);

        assert_eq!(history.len(), 2);
        let codes: Vec<_> = history.codes().cloned().collect();
        assert_eq!(codes, vec![first.clone(), second.clone()]);
        assert_eq!(history.get(&first).unwrap().len(), 2);
        assert_eq!(history.get(&second).unwrap()[0].name, "c");
    }

    #[test]
    fn test_interleaved_lines_join_their_group() {
        let first = ConfirmationCode::from_bytes(&[0x11; ConfirmationCode::BYTES]);
        let second = ConfirmationCode::from_bytes(&[0x22; ConfirmationCode::BYTES]);
        let history = OrderHistory::from_lines([
            line(1, &first, "a"),
            line(2, &second, "b"),
            line(3, &first, "c"),
            line(4, &second, "d"),
        ]);

        assert_eq!(history.len(), 2);
        let names = |code| {
            history
                .get(code)
                .unwrap()
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), ["a", "c"]);
        assert_eq!(names(&second), ["b", "d"]);
        let unknown = ConfirmationCode::from_bytes(&[0x33; ConfirmationCode::BYTES]);
        assert!(history.get(&unknown).is_none());
    }

    #[test]
    fn test_serializes_as_object_in_purchase_order() {
        let first = ConfirmationCode::from_bytes(&[0xff; ConfirmationCode::BYTES]);
        let second = ConfirmationCode::from_bytes(&[0x00; ConfirmationCode::BYTES]);
        let history = OrderHistory::from_lines([line(1, &first, "a"), line(2, &second, "b")]);

        let json = serde_json::to_string(&history).unwrap();
        let first_at = json.find(first.as_str()).unwrap();
        let second_at = json.find(second.as_str()).unwrap();
        assert!(first_at < second_at);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[first.as_str()][0]["name"], "a");
        assert_eq!(value[first.as_str()][0]["price"], 100.0);
    }

    #[test]
    fn test_empty_history_is_empty_object() {
        let history = OrderHistory::default();
        assert!(history.is_empty());
        assert_eq!(serde_json::to_string(&history).unwrap(), "{}");
    }

    #[test]
    fn test_order_line_request_wire_names() {
        let req: OrderLineRequest =
            serde_json::from_str(r#"{"itemId": 4, "quantity": 2}"#).unwrap();
        assert_eq!(req.item_id, ItemId::new(4));
        assert_eq!(req.quantity.get(), 2);

        assert!(serde_json::from_str::<OrderLineRequest>(r#"{"itemId": 4, "quantity": 0}"#).is_err());
    }
}
