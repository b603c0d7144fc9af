use crate::FlightRecord;

pub fn sample_flights() -> Vec<FlightRecord> {
    vec![
        FlightRecord::new(
            "AA123",
            "New York (JFK)",
            "Los Angeles (LAX)",
            "08:00 AM",
            "11:30 AM",
            "On Time",
        )
        .with_gate("A12")
        .with_terminal("Terminal 4"),
        FlightRecord::new(
            "DL456",
            "Chicago (ORD)",
            "Miami (MIA)",
            "02:15 PM",
            "06:45 PM",
            "Delayed - 30 minutes",
        )
        .with_gate("B8")
        .with_terminal("Terminal 1"),
        FlightRecord::new(
            "UA789",
            "San Francisco (SFO)",
            "Seattle (SEA)",
            "05:20 PM",
            "07:40 PM",
            "Boarding",
        )
        .with_gate("C15")
        .with_terminal("Terminal 3"),
        FlightRecord::new(
            "SW101",
            "Denver (DEN)",
            "Phoenix (PHX)",
            "09:45 AM",
            "11:10 AM",
            "Cancelled",
        )
        .with_terminal("Terminal West"),
    ]
}
