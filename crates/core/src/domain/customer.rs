use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerGroupId(pub String);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub groups: Vec<CustomerGroupId>,
}

impl Customer {
    pub fn is_in_group(&self, group: &CustomerGroupId) -> bool {
        self.groups.iter().any(|candidate| candidate == group)
    }
}
