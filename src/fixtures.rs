//! Small processed bills sample shared by the unit tests

use crate::{table::Table, TableLoader};

/// Eight buildings in climate zones 3, 7 and 9
///
/// Building #0 carries the monthly series used by the analytics tests,
/// building #7 has no average EUI.
pub const BILLS: &str = "\
cis,cis,cis,cis,cis,cis,cis,cis,cis,cis,cis,cis,cis,summary,summary,EUI_elec,EUI_elec,EUI_elec,EUI_elec,EUI_gas,EUI_gas,EUI_gas,EUI_gas,EUI_tot,EUI_tot,EUI_tot,EUI_tot
property_id,address,city,zip,utility,cz,building_type,year_built,building_area,Latitude,Longitude,date_transfer,range_address_ind,EUI_tot_avg_2009_2015,EUI_tot_fit_2009_2015,2014-01,2013-01,2013-02,2014-02,2014-01,2013-01,2013-02,2014-02,2014-01,2013-01,2013-02,2014-02
P1,1 Main St,Fresno,93701,PGE,3,Office building,1990,10000,36.7,-119.8,2010-05-01,true,50,-1.0,5,4,3,NA,2,1,1,2,7,5,4,NA
P2,2 Main St,Fresno,93701,PGE,3,Office building,1985,20000,36.8,-119.7,,false,60,-0.5,6,5,5,6,1,1,1,1,7,6,6,7
P3,3 Oak Ave,Oakland,94601,PGE,3.0,Warehouse,2001,50000,37.8,-122.2,,0,20,0.2,2,2,2,2,0,0,0,0,2,2,2,2
P4,4 Elm St,San Diego,92101,SDGE,7,Office building,1975,,32.7,-117.1,2012-01-15,1,70,1.5,7,7,7,7,1,1,1,1,8,8,8,8
P5,5 Pine St,San Diego,92102,SDGE,7,Office building,,15000,,,,,40,,4,4,4,4,1,1,1,1,5,5,5,5
P6,6 Palm Dr,Los Angeles,90001,SCE,9,Warehouse,1960,80000,34.0,-118.2,,,25,0.0,3,3,3,3,0,0,0,0,3,3,3,3
P7,7 Palm Dr,Los Angeles,90002,SCE,9,Office building,1999,30000,34.1,-118.3,,,55,-2.0,5,5,5,5,1,1,1,1,6,6,6,6
P8,8 Oak Ave,Oakland,94602,PGE,3,Office building,2010,12000,37.7,-122.1,,,NA,0.5,4,4,4,4,1,1,1,1,5,5,5,5
";

pub fn table() -> Table {
    TableLoader::default().from_reader(BILLS.as_bytes()).unwrap()
}
